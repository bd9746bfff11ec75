//! 2D stick-figure pose editor.
//!
//! The editor core ([`Scene`], [`Joint`], [`Bone`], the preset tables and the
//! pose codec) is toolkit-agnostic apart from egui's geometry types; the
//! eframe front-end lives in [`app`].

pub mod app;
pub mod bone;
pub mod codec;
pub mod color;
pub mod config;
pub mod error;
pub mod joint;
pub mod overlay;
pub mod preset;
pub mod raster;
pub mod render;
pub mod scene;

pub use bone::Bone;
pub use codec::{Pose, PoseEntry};
pub use color::Color;
pub use error::{PoseError, Result};
pub use joint::Joint;
pub use preset::{Preset, PresetLibrary};
pub use render::{BoneStyle, Canvas, Controls, RenderConfig};
pub use scene::{ImportSummary, Scene};
