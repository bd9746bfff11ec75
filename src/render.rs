//! Drawing seam between the editor core and whatever paints pixels.
//!
//! The scene never talks to egui or `image` directly; it issues primitive
//! calls on a [`Canvas`] using canvas-local pixel coordinates, and reads the
//! shared style through an immutable [`RenderConfig`] snapshot.

use eframe::egui::{self, Pos2, Vec2};

use crate::color::Color;

pub const DEFAULT_BONE_WIDTH: f32 = 8.0;
pub const DEFAULT_JOINT_DIAMETER: f32 = 8.0;
pub const OFFSET_Z_RANGE: std::ops::RangeInclusive<f32> = -5.0..=5.0;

pub trait Canvas {
    fn line(&mut self, a: Pos2, b: Pos2, width: f32, color: Color);

    /// Filled ellipse with semi-axes `radii`, rotated by `angle` radians.
    fn ellipse(&mut self, center: Pos2, radii: Vec2, angle: f32, color: Color);

    fn circle(&mut self, center: Pos2, radius: f32, color: Color);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoneStyle {
    Line,
    Ellipse,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Mirror {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Mirror {
    pub fn any(self) -> bool {
        self.horizontal || self.vertical
    }

    /// Delta applied to a mirror partner when its counterpart moves by `delta`.
    pub fn apply(self, delta: Vec2) -> Vec2 {
        egui::vec2(
            if self.horizontal { -delta.x } else { delta.x },
            if self.vertical { -delta.y } else { delta.y },
        )
    }
}

/// User-editable style state, written by the UI widgets.
#[derive(Clone, Debug, PartialEq)]
pub struct Controls {
    /// Slider values; positive y moves the figure up.
    pub offset: [f32; 3],
    pub bone_width: f32,
    pub joint_diameter: f32,
    pub bone_style: BoneStyle,
    pub mirror: Mirror,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            offset: [0.0; 3],
            bone_width: DEFAULT_BONE_WIDTH,
            joint_diameter: DEFAULT_JOINT_DIAMETER,
            bone_style: BoneStyle::Ellipse,
            mirror: Mirror::default(),
        }
    }
}

impl Controls {
    pub fn reset_offset(&mut self) {
        self.offset = [0.0; 3];
    }

    pub fn reset_sizes(&mut self) {
        self.bone_width = DEFAULT_BONE_WIDTH;
        self.joint_diameter = DEFAULT_JOINT_DIAMETER;
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            offset: egui::vec2(self.offset[0], -self.offset[1]),
            depth: self.offset[2],
            bone_width: self.bone_width,
            joint_diameter: self.joint_diameter,
            bone_style: self.bone_style,
            mirror: self.mirror,
        }
    }
}

/// Per-frame snapshot of [`Controls`] in screen terms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderConfig {
    pub offset: Vec2,
    pub depth: f32,
    pub bone_width: f32,
    pub joint_diameter: f32,
    pub bone_style: BoneStyle,
    pub mirror: Mirror,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Controls::default().render_config()
    }
}

impl RenderConfig {
    /// Scale factor derived from the z offset; 1.0 at z = 0.
    pub fn perspective(&self) -> f32 {
        let z = self.depth.clamp(*OFFSET_Z_RANGE.start(), *OFFSET_Z_RANGE.end());
        1.0 + z / 10.0
    }

    /// Base position to rendered position.
    pub fn project(&self, pos: Pos2, center: Pos2) -> Pos2 {
        center + (pos - center) * self.perspective() + self.offset
    }

    pub fn unproject(&self, screen: Pos2, center: Pos2) -> Pos2 {
        center + (screen - self.offset - center) / self.perspective()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_is_identity_without_offset() {
        let cfg = RenderConfig::default();
        let c = egui::pos2(256.0, 256.0);
        let p = egui::pos2(10.0, 400.0);
        assert_eq!(cfg.project(p, c), p);
    }

    #[test]
    fn unproject_inverts_project() {
        let mut controls = Controls::default();
        controls.offset = [30.0, 12.0, 2.5];
        let cfg = controls.render_config();
        let c = egui::pos2(400.0, 300.0);
        let p = egui::pos2(123.0, 456.0);
        let back = cfg.unproject(cfg.project(p, c), c);
        assert!((back - p).length() < 1e-3);
    }

    #[test]
    fn y_slider_moves_figure_up() {
        let mut controls = Controls::default();
        controls.offset = [0.0, 20.0, 0.0];
        let cfg = controls.render_config();
        let c = egui::pos2(100.0, 100.0);
        assert_eq!(cfg.project(c, c), egui::pos2(100.0, 80.0));
    }

    #[test]
    fn perspective_is_monotonic_in_z() {
        let mut cfg = RenderConfig::default();
        let mut last = 0.0;
        for z in [-5.0, -1.0, 0.0, 0.5, 5.0] {
            cfg.depth = z;
            assert!(cfg.perspective() > last);
            last = cfg.perspective();
        }
    }

    #[test]
    fn mirror_negates_selected_axes() {
        let d = egui::vec2(3.0, -4.0);
        let h = Mirror { horizontal: true, vertical: false };
        let v = Mirror { horizontal: false, vertical: true };
        assert_eq!(h.apply(d), egui::vec2(-3.0, -4.0));
        assert_eq!(v.apply(d), egui::vec2(3.0, 4.0));
        assert!(!Mirror::default().any());
    }

    #[test]
    fn reset_sizes_restores_defaults() {
        let mut controls = Controls::default();
        controls.bone_width = 30.0;
        controls.joint_diameter = 2.0;
        controls.reset_sizes();
        assert_eq!(controls.bone_width, DEFAULT_BONE_WIDTH);
        assert_eq!(controls.joint_diameter, DEFAULT_JOINT_DIAMETER);
    }
}
