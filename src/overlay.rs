//! Reference image shown under the skeleton.
//!
//! Decoding happens on a worker thread; the result arrives over a channel
//! and is picked up by [`Overlay::poll`] once per frame. Only then is the
//! fit size computed and the overlay enabled.

use eframe::egui::{self, Vec2};
use image::DynamicImage;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};

use crate::error::{PoseError, Result};

pub const OVERLAY_ALPHA: u8 = 127;

#[derive(Default)]
pub struct Overlay {
    image: Option<DynamicImage>,
    texture: Option<egui::TextureHandle>,
    size: Vec2,
    enabled: bool,
    pending: Option<Pending>,
}

struct Pending {
    path: PathBuf,
    rx: Receiver<Result<DynamicImage>>,
    /// `enabled` before the load started, restored if it fails.
    was_enabled: bool,
}

/// Uniformly scale `image` to fit inside `canvas`.
pub fn fit_size(canvas: Vec2, image: Vec2) -> Vec2 {
    let ratio = (canvas.x / image.x).min(canvas.y / image.y);
    image * ratio
}

impl Overlay {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Fitted size in canvas pixels.
    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn displayable(&self) -> bool {
        self.enabled && self.image.is_some()
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    /// Start decoding `path` in the background. Disables the overlay until done.
    pub fn load(&mut self, path: PathBuf) {
        let (tx, rx) = mpsc::channel();
        let worker_path = path.clone();
        std::thread::spawn(move || {
            let result = image::open(&worker_path).map_err(PoseError::from);
            // The receiver is gone if another load replaced this one.
            let _ = tx.send(result);
        });
        log::info!("loading overlay {}", path.display());
        let was_enabled = self.pending.as_ref().map_or(self.enabled, |p| p.was_enabled);
        self.enabled = false;
        self.pending = Some(Pending { path, rx, was_enabled });
    }

    /// Check for a finished load. `Some` once the outcome is known.
    pub fn poll(&mut self, canvas: Vec2) -> Option<Result<()>> {
        let pending = self.pending.take()?;
        let path = &pending.path;
        let outcome = match pending.rx.try_recv() {
            Ok(Ok(img)) => {
                log::info!("overlay {} decoded ({}x{})", path.display(), img.width(), img.height());
                self.set_image(img, canvas);
                Ok(())
            }
            Ok(Err(e)) => {
                log::error!("failed to load overlay {}: {e}", path.display());
                Err(e)
            }
            Err(TryRecvError::Empty) => {
                self.pending = Some(pending);
                return None;
            }
            Err(TryRecvError::Disconnected) => Err(PoseError::Io(std::io::Error::other(format!(
                "overlay loader for {} exited",
                path.display()
            )))),
        };
        if outcome.is_err() {
            self.enabled = pending.was_enabled;
        }
        Some(outcome)
    }

    /// Install a decoded image, fit it to `canvas` and enable the overlay.
    pub fn set_image(&mut self, img: DynamicImage, canvas: Vec2) {
        self.image = Some(img);
        self.texture = None;
        self.refit(canvas);
        self.enabled = true;
    }

    pub fn refit(&mut self, canvas: Vec2) {
        if let Some(img) = &self.image {
            self.size = fit_size(canvas, egui::vec2(img.width() as f32, img.height() as f32));
        }
    }

    pub fn texture(&mut self, ctx: &egui::Context) -> Option<&egui::TextureHandle> {
        if self.texture.is_none() {
            let img = self.image.as_ref()?;
            let rgba = img.to_rgba8();
            let size = [rgba.width() as usize, rgba.height() as usize];
            let pixels = rgba.as_flat_samples();
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
            self.texture = Some(ctx.load_texture("overlay", color_image, egui::TextureOptions::LINEAR));
        }
        self.texture.as_ref()
    }
}
