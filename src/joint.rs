use eframe::egui::{Pos2, Vec2};

use crate::color::Color;
use crate::render::{Canvas, RenderConfig};

#[derive(Clone, Copy, Debug)]
struct Grab {
    /// Rendered joint position minus pointer at press time.
    offset: Vec2,
    /// Base position at press time.
    start: Pos2,
}

#[derive(Clone, Debug)]
pub struct Joint {
    pub name: String,
    /// Base position in canvas pixels, before the global offset.
    pub pos: Pos2,
    pub color: Color,
    /// Index of the mirror partner in the owning scene.
    pub mirror: Option<usize>,
    rendered: Pos2,
    diameter: f32,
    grab: Option<Grab>,
}

impl Joint {
    pub fn new(name: impl Into<String>, pos: Pos2, color: Color) -> Self {
        Self {
            name: name.into(),
            pos,
            color,
            mirror: None,
            rendered: pos,
            diameter: RenderConfig::default().joint_diameter,
            grab: None,
        }
    }

    pub fn rendered(&self) -> Pos2 {
        self.rendered
    }

    pub fn rendered_diameter(&self) -> f32 {
        self.diameter
    }

    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }

    /// Recompute the rendered position; while dragging, follow `pointer`.
    ///
    /// Returns how far the base position has moved since the press, so the
    /// caller can carry the mirror partner along.
    pub fn update(&mut self, cfg: &RenderConfig, center: Pos2, pointer: Option<Pos2>) -> Option<Vec2> {
        if let (Some(grab), Some(p)) = (self.grab, pointer) {
            self.pos = cfg.unproject(p + grab.offset, center);
        }
        self.sync(cfg, center);
        self.grab.map(|g| self.pos - g.start)
    }

    /// Refresh the rendered position without touching drag state.
    pub fn sync(&mut self, cfg: &RenderConfig, center: Pos2) {
        self.rendered = cfg.project(self.pos, center);
        self.diameter = cfg.joint_diameter * cfg.perspective();
    }

    pub fn is_over(&self, pointer: Pos2) -> bool {
        let r = self.diameter / 2.0;
        (pointer - self.rendered).length_sq() <= r * r
    }

    pub fn pressed(&mut self, pointer: Pos2) -> bool {
        if !self.is_over(pointer) {
            return false;
        }
        self.grab = Some(Grab {
            offset: self.rendered - pointer,
            start: self.pos,
        });
        true
    }

    pub fn released(&mut self) {
        self.grab = None;
    }

    pub fn show(&self, canvas: &mut dyn Canvas) {
        canvas.circle(self.rendered, self.diameter / 2.0, self.color);
    }
}
