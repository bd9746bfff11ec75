use eframe::egui;

use crate::color::Color;
use crate::joint::Joint;
use crate::render::{BoneStyle, Canvas, RenderConfig};

/// Segment between two joints of the owning scene, referenced by index.
#[derive(Clone, Debug)]
pub struct Bone {
    pub name: String,
    pub start: usize,
    pub end: usize,
    pub color: Color,
}

impl Bone {
    pub fn show(&self, joints: &[Joint], cfg: &RenderConfig, canvas: &mut dyn Canvas) {
        let a = joints[self.start].rendered();
        let b = joints[self.end].rendered();
        let width = cfg.bone_width * cfg.perspective();
        match cfg.bone_style {
            BoneStyle::Line => canvas.line(a, b, width, self.color),
            BoneStyle::Ellipse => {
                let d = b - a;
                let center = a + d * 0.5;
                let radii = egui::vec2(d.length() / 2.0, width / 2.0);
                canvas.ellipse(center, radii, d.angle(), self.color);
            }
        }
    }
}
