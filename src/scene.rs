use eframe::egui::{self, Pos2, Vec2};
use std::path::Path;

use crate::bone::Bone;
use crate::codec::{round1d, Pose, PoseEntry};
use crate::color::Color;
use crate::error::Result;
use crate::joint::Joint;
use crate::overlay::Overlay;
use crate::preset::{Preset, BONES};
use crate::raster::ImageCanvas;
use crate::render::{Canvas, Controls, RenderConfig};

/// Outcome of applying an imported pose.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub applied: usize,
    /// Names in the input that the current skeleton does not have.
    pub ignored: Vec<String>,
}

#[derive(Clone, Copy, Debug)]
struct DragSession {
    joint: usize,
    /// Mirror partner and its base position when the drag began.
    partner: Option<(usize, Pos2)>,
}

pub struct Scene {
    size: Vec2,
    preset: Preset,
    joints: Vec<Joint>,
    bones: Vec<Bone>,
    drag: Option<DragSession>,
    pub controls: Controls,
    pub overlay: Overlay,
}

impl Scene {
    pub fn new(preset: &Preset, size: Vec2) -> Result<Self> {
        let mut scene = Self {
            size,
            preset: preset.clone(),
            joints: Vec::new(),
            bones: Vec::new(),
            drag: None,
            controls: Controls::default(),
            overlay: Overlay::default(),
        };
        scene.switch_preset(preset)?;
        Ok(scene)
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn center(&self) -> Pos2 {
        (self.size / 2.0).to_pos2()
    }

    pub fn preset(&self) -> &Preset {
        &self.preset
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn joint(&self, name: &str) -> Option<&Joint> {
        self.index_of(name).map(|i| &self.joints[i])
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|j| j.name == name)
    }

    pub fn render_config(&self) -> RenderConfig {
        self.controls.render_config()
    }

    /// Discard all joints and bones and rebuild them from `preset`.
    pub fn switch_preset(&mut self, preset: &Preset) -> Result<()> {
        preset.validate()?;
        let center = self.center();
        let mut joints: Vec<Joint> = preset
            .joints
            .iter()
            .map(|d| Joint::new(&d.name, center + egui::vec2(d.x, d.y), d.color))
            .collect();
        for (i, def) in preset.joints.iter().enumerate() {
            joints[i].mirror = def
                .mirror
                .as_deref()
                .and_then(|m| preset.joints.iter().position(|j| j.name == m));
        }
        let find = |name: &str| joints.iter().position(|j| j.name == name);
        // Endpoints are guaranteed present by `validate`.
        let bones: Vec<Bone> = BONES
            .iter()
            .filter_map(|b| {
                Some(Bone {
                    name: b.name.to_string(),
                    start: find(b.start)?,
                    end: find(b.end)?,
                    color: b.color,
                })
            })
            .collect();

        self.preset = preset.clone();
        self.joints = joints;
        self.bones = bones;
        self.drag = None;
        self.controls.reset_offset();
        self.sync();
        log::info!("preset `{}`: {} joints, {} bones", preset.name, self.joints.len(), self.bones.len());
        Ok(())
    }

    /// Restore the active preset's rest positions with zero offset.
    pub fn reset_pose(&mut self) {
        self.controls.reset_offset();
        let center = self.center();
        for joint in &mut self.joints {
            if let Some(def) = self.preset.joint(&joint.name) {
                joint.pos = center + egui::vec2(def.x, def.y);
            }
        }
        self.sync();
    }

    /// Change canvas dimensions while keeping the pose centered.
    pub fn resize(&mut self, size: Vec2) {
        let center = self.center();
        let relative: Vec<Vec2> = self.joints.iter().map(|j| j.pos - center).collect();
        self.size = size;
        self.controls.reset_offset();
        let center = self.center();
        for (joint, rel) in self.joints.iter_mut().zip(relative) {
            joint.pos = center + rel;
        }
        self.overlay.refit(size);
        self.sync();
        log::info!("canvas resized to {}x{}", size.x, size.y);
    }

    fn sync(&mut self) {
        let cfg = self.render_config();
        let center = self.center();
        for joint in &mut self.joints {
            joint.sync(&cfg, center);
        }
    }

    /// Per-frame update: move the dragged joint and its mirror partner.
    pub fn update(&mut self, pointer: Option<Pos2>) {
        let cfg = self.render_config();
        let center = self.center();
        let mut moved = None;
        for (i, joint) in self.joints.iter_mut().enumerate() {
            if let Some(delta) = joint.update(&cfg, center, pointer) {
                moved = Some((i, delta));
            }
        }
        let Some(session) = self.drag else { return };
        if let (Some((i, delta)), Some((partner, anchor))) = (moved, session.partner) {
            if i == session.joint && cfg.mirror.any() {
                let p = &mut self.joints[partner];
                p.pos = anchor + cfg.mirror.apply(delta);
                p.sync(&cfg, center);
            }
        }
    }

    pub fn show(&self, canvas: &mut dyn Canvas) {
        let cfg = self.render_config();
        for bone in &self.bones {
            bone.show(&self.joints, &cfg, canvas);
        }
        for joint in &self.joints {
            joint.show(canvas);
        }
    }

    /// Grab the topmost joint under `pointer`, if any.
    pub fn pressed(&mut self, pointer: Pos2) -> Option<&str> {
        self.released();
        let i = self.joints.iter_mut().rposition(|j| j.pressed(pointer))?;
        let partner = self.joints[i].mirror.map(|m| (m, self.joints[m].pos));
        self.drag = Some(DragSession { joint: i, partner });
        log::debug!("grabbed {}", self.joints[i].name);
        Some(self.joints[i].name.as_str())
    }

    pub fn released(&mut self) {
        if let Some(session) = self.drag.take() {
            log::debug!("released {}", self.joints[session.joint].name);
        }
        for joint in &mut self.joints {
            joint.released();
        }
    }

    pub fn dragging(&self) -> Option<&str> {
        self.drag.map(|s| self.joints[s.joint].name.as_str())
    }

    /// Name of the topmost joint under `pointer`.
    pub fn hovered(&self, pointer: Pos2) -> Option<&str> {
        self.joints.iter().rev().find(|j| j.is_over(pointer)).map(|j| j.name.as_str())
    }

    /// Joint positions relative to the canvas center, rounded to tenths.
    pub fn get_pose(&self, with_color: bool) -> Pose {
        let center = self.center();
        let mut pose = Pose::default();
        for joint in &self.joints {
            let rel = joint.pos - center;
            let color = with_color
                .then(|| self.preset.joint(&joint.name).map(|d| d.color))
                .flatten();
            pose.push(
                &joint.name,
                PoseEntry {
                    x: round1d(rel.x),
                    y: round1d(rel.y),
                    color,
                },
            );
        }
        pose
    }

    pub fn export_pose(&self) -> String {
        self.get_pose(false).to_export_text()
    }

    /// Apply `pose`; joints it does not name keep their position.
    pub fn set_pose(&mut self, pose: &Pose) -> ImportSummary {
        let center = self.center();
        let mut summary = ImportSummary::default();
        for (name, entry) in pose.iter() {
            match self.index_of(name) {
                Some(i) => {
                    self.joints[i].pos = center + egui::vec2(entry.x as f32, entry.y as f32);
                    summary.applied += 1;
                }
                None => {
                    log::warn!("ignoring unknown joint `{name}` in pose");
                    summary.ignored.push(name.to_string());
                }
            }
        }
        self.sync();
        summary
    }

    /// Parse `text` and apply it. Nothing changes if parsing fails.
    pub fn import_pose(&mut self, text: &str) -> Result<ImportSummary> {
        let pose = Pose::from_json(text)?;
        let summary = self.set_pose(&pose);
        log::info!("imported pose: {} applied, {} ignored", summary.applied, summary.ignored.len());
        Ok(summary)
    }

    pub fn save_pose(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.get_pose(false).to_json(true)?)?;
        log::info!("saved pose to {}", path.display());
        Ok(())
    }

    pub fn load_pose(&mut self, path: &Path) -> Result<ImportSummary> {
        let text = std::fs::read_to_string(path)?;
        self.import_pose(&text)
    }

    /// Reflect the pose about the mirror center joint, swapping partners.
    pub fn flip_pose(&mut self) {
        let axis = self
            .index_of(&self.preset.mirror_center)
            .map_or(self.center().x, |i| self.joints[i].pos.x);
        let before: Vec<Pos2> = self.joints.iter().map(|j| j.pos).collect();
        for (i, joint) in self.joints.iter_mut().enumerate() {
            let src = before[joint.mirror.unwrap_or(i)];
            joint.pos = egui::pos2(2.0 * axis - src.x, src.y);
        }
        self.sync();
    }

    /// Rasterize the skeleton on black at canvas size.
    pub fn render_image(&self) -> image::RgbaImage {
        let mut canvas = ImageCanvas::new(self.size.x.round() as u32, self.size.y.round() as u32, Color::BLACK);
        self.show(&mut canvas);
        canvas.into_image()
    }

    pub fn render_png(&self, path: &Path) -> Result<()> {
        self.render_image().save(path)?;
        log::info!("exported skeleton image to {}", path.display());
        Ok(())
    }
}
