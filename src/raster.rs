use eframe::egui::{Pos2, Vec2};
use image::{Rgba, RgbaImage};

use crate::color::Color;
use crate::render::Canvas;

/// Software canvas used for PNG export.
pub struct ImageCanvas {
    img: RgbaImage,
}

impl ImageCanvas {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            img: RgbaImage::from_pixel(width, height, Rgba(background.to_rgba())),
        }
    }

    pub fn into_image(self) -> RgbaImage {
        self.img
    }

    fn put(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x >= 0 && y >= 0 && (x as u32) < self.img.width() && (y as u32) < self.img.height() {
            self.img.put_pixel(x as u32, y as u32, Rgba(color));
        }
    }

    /// Fill every pixel whose center satisfies `inside`, within the given bounds.
    fn fill(&mut self, min: Pos2, max: Pos2, color: [u8; 4], inside: impl Fn(f32, f32) -> bool) {
        let (w, h) = (self.img.width() as i32, self.img.height() as i32);
        let (x0, y0) = ((min.x.floor() as i32).max(0), (min.y.floor() as i32).max(0));
        let (x1, y1) = ((max.x.ceil() as i32).min(w - 1), (max.y.ceil() as i32).min(h - 1));
        for py in y0..=y1 {
            for px in x0..=x1 {
                if inside(px as f32 + 0.5, py as f32 + 0.5) {
                    self.put(px, py, color);
                }
            }
        }
    }
}

/// Liang-Barsky clip of segment `a`-`b` to the box `min`..`max`.
fn clip_segment(a: Pos2, b: Pos2, min: Pos2, max: Pos2) -> Option<(Pos2, Pos2)> {
    let d = b - a;
    let (mut t0, mut t1) = (0.0f32, 1.0f32);
    for (p, q) in [
        (-d.x, a.x - min.x),
        (d.x, max.x - a.x),
        (-d.y, a.y - min.y),
        (d.y, max.y - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }
    (t0 <= t1).then(|| (a + d * t0, a + d * t1))
}

impl Canvas for ImageCanvas {
    fn line(&mut self, a: Pos2, b: Pos2, width: f32, color: Color) {
        let c = color.to_rgba();
        let half_t = (width / 2.0).max(0.5) as i32;
        let margin = Vec2::splat(half_t as f32 + 1.0);
        let bounds = Vec2::new(self.img.width() as f32, self.img.height() as f32);
        let Some((a, b)) = clip_segment(a, b, Pos2::ZERO - margin, bounds.to_pos2() + margin) else {
            return;
        };
        let d = b - a;
        let steps = (d.length() * 2.0) as i32;
        for i in 0..=steps {
            let t = i as f32 / steps.max(1) as f32;
            let cx = (a.x + d.x * t) as i32;
            let cy = (a.y + d.y * t) as i32;
            for oy in -half_t..=half_t {
                for ox in -half_t..=half_t {
                    self.put(cx + ox, cy + oy, c);
                }
            }
        }
    }

    fn ellipse(&mut self, center: Pos2, radii: Vec2, angle: f32, color: Color) {
        if radii.x <= 0.0 || radii.y <= 0.0 {
            return;
        }
        let (sin, cos) = angle.sin_cos();
        let reach = radii.x.max(radii.y);
        let bound = Vec2::splat(reach);
        self.fill(center - bound, center + bound, color.to_rgba(), |x, y| {
            let (dx, dy) = (x - center.x, y - center.y);
            let u = dx * cos + dy * sin;
            let v = -dx * sin + dy * cos;
            (u / radii.x).powi(2) + (v / radii.y).powi(2) <= 1.0
        });
    }

    fn circle(&mut self, center: Pos2, radius: f32, color: Color) {
        let bound = Vec2::splat(radius);
        self.fill(center - bound, center + bound, color.to_rgba(), |x, y| {
            (x - center.x).powi(2) + (y - center.y).powi(2) <= radius * radius
        });
    }
}
