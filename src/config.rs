use clap::Parser;
use eframe::egui;
use std::path::PathBuf;

use crate::preset::DEFAULT_PRESET;

pub const CANVAS_RANGE: std::ops::RangeInclusive<f32> = 64.0..=4096.0;

#[derive(Parser, Debug, Clone)]
#[command(name = "pose-edit", version, about = "Drag joints to pose a stick figure")]
pub struct Cli {
    /// Reference image to show under the skeleton
    pub overlay: Option<PathBuf>,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 512.0)]
    pub width: f32,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 512.0)]
    pub height: f32,

    /// Preset to start with
    #[arg(long, default_value = DEFAULT_PRESET)]
    pub preset: String,

    /// Extra presets file, merged over the built-in ones
    #[arg(long)]
    pub presets: Option<PathBuf>,

    /// Pose JSON file to apply at startup
    #[arg(long)]
    pub pose: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn canvas_size(&self) -> egui::Vec2 {
        let clamp = |v: f32| v.clamp(*CANVAS_RANGE.start(), *CANVAS_RANGE.end());
        egui::vec2(clamp(self.width), clamp(self.height))
    }
}
