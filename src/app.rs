use eframe::egui::{self, Pos2, Vec2};
use egui_extras::{Column, TableBuilder};

use crate::color::Color;
use crate::config::{Cli, CANVAS_RANGE};
use crate::error::Result;
use crate::overlay::OVERLAY_ALPHA;
use crate::preset::PresetLibrary;
use crate::render::{BoneStyle, Canvas, OFFSET_Z_RANGE};
use crate::scene::{ImportSummary, Scene};

const ELLIPSE_SEGMENTS: usize = 32;

// ── Painter-backed canvas ───────────────────────────────────────────────────

/// Draws canvas-local coordinates onto an egui painter anchored at `origin`.
struct PainterCanvas<'a> {
    painter: &'a egui::Painter,
    origin: Vec2,
}

impl Canvas for PainterCanvas<'_> {
    fn line(&mut self, a: Pos2, b: Pos2, width: f32, color: Color) {
        self.painter.line_segment(
            [a + self.origin, b + self.origin],
            egui::Stroke::new(width, color.to_egui()),
        );
    }

    fn ellipse(&mut self, center: Pos2, radii: Vec2, angle: f32, color: Color) {
        let (sin, cos) = angle.sin_cos();
        let c = center + self.origin;
        let points = (0..ELLIPSE_SEGMENTS)
            .map(|i| {
                let t = i as f32 / ELLIPSE_SEGMENTS as f32 * std::f32::consts::TAU;
                let (u, v) = (radii.x * t.cos(), radii.y * t.sin());
                c + egui::vec2(u * cos - v * sin, u * sin + v * cos)
            })
            .collect();
        self.painter
            .add(egui::Shape::convex_polygon(points, color.to_egui(), egui::Stroke::NONE));
    }

    fn circle(&mut self, center: Pos2, radius: f32, color: Color) {
        self.painter.circle_filled(center + self.origin, radius, color.to_egui());
    }
}

// ── App ─────────────────────────────────────────────────────────────────────

pub struct PoseEditorApp {
    scene: Scene,
    library: PresetLibrary,
    preset_name: String,
    pose_text: String,
    canvas_input: [f32; 2],
    status: String,
    hovered: Option<String>,
}

impl PoseEditorApp {
    pub fn new(cli: &Cli) -> Result<Self> {
        let mut library = PresetLibrary::builtin()?;
        if let Some(path) = &cli.presets {
            library.extend_from_file(path)?;
        }
        let size = cli.canvas_size();
        let mut scene = Scene::new(library.get(&cli.preset)?, size)?;
        if let Some(path) = &cli.pose {
            scene.load_pose(path)?;
        }
        if let Some(path) = &cli.overlay {
            scene.overlay.load(path.clone());
        }
        Ok(Self {
            scene,
            library,
            preset_name: cli.preset.clone(),
            pose_text: String::new(),
            canvas_input: [size.x, size.y],
            status: String::new(),
            hovered: None,
        })
    }

    fn select_preset(&mut self, name: String) {
        match self.library.get(&name).and_then(|p| self.scene.switch_preset(p)) {
            Ok(()) => {
                self.status = format!("Preset: {name}");
                self.preset_name = name;
            }
            Err(e) => self.status = format!("Preset failed: {e}"),
        }
    }

    fn report_import(&mut self, result: Result<ImportSummary>) -> bool {
        match result {
            Ok(summary) if summary.ignored.is_empty() => {
                self.status = format!("Imported {} joints", summary.applied);
                true
            }
            Ok(summary) => {
                self.status = format!(
                    "Imported {} joints, ignored: {}",
                    summary.applied,
                    summary.ignored.join(", ")
                );
                true
            }
            Err(e) => {
                self.status = format!("Import failed: {e}");
                false
            }
        }
    }

    fn import_text(&mut self) {
        let result = self.scene.import_pose(&self.pose_text);
        if self.report_import(result) {
            self.pose_text.clear();
        }
    }

    fn pick_overlay(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "webp", "bmp"])
            .pick_file()
        {
            self.status = format!("Loading {}…", path.display());
            self.scene.overlay.load(path);
        }
    }

    fn save_pose(&mut self) {
        let Some(path) = pose_dialog().save_file() else { return };
        self.status = match self.scene.save_pose(&path) {
            Ok(()) => format!("Saved {}", path.display()),
            Err(e) => format!("Save failed: {e}"),
        };
    }

    fn load_pose(&mut self) {
        let Some(path) = pose_dialog().pick_file() else { return };
        let result = self.scene.load_pose(&path);
        self.report_import(result);
    }

    fn export_png(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_file_name("pose.png")
            .save_file()
        else {
            return;
        };
        self.status = match self.scene.render_png(&path) {
            Ok(()) => format!("Exported {}", path.display()),
            Err(e) => format!("Export failed: {e}"),
        };
    }

    fn copy_json(&mut self, ctx: &egui::Context, color: bool, formatted: bool) {
        match self.scene.get_pose(color).to_json(formatted) {
            Ok(json) => {
                ctx.copy_text(json);
                self.status = "Pose JSON copied".into();
            }
            Err(e) => self.status = format!("Copy failed: {e}"),
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let mut selected = self.preset_name.clone();
            egui::ComboBox::from_label("Preset")
                .selected_text(selected.as_str())
                .show_ui(ui, |ui| {
                    for name in self.library.names() {
                        ui.selectable_value(&mut selected, name.to_string(), name);
                    }
                });
            if selected != self.preset_name {
                self.select_preset(selected);
            }
            if ui.button("Reset pose").clicked() {
                self.scene.reset_pose();
            }
            if ui.button("Flip").clicked() {
                self.scene.flip_pose();
            }
            ui.separator();
            if ui.button("Load overlay…").clicked() {
                self.pick_overlay();
            }
            let label = if self.scene.overlay.enabled() { "Hide overlay" } else { "Show overlay" };
            if ui.button(label).clicked() {
                self.scene.overlay.toggle();
            }
            ui.separator();
            if ui.button("Save pose…").clicked() {
                self.save_pose();
            }
            if ui.button("Open pose…").clicked() {
                self.load_pose();
            }
            if ui.button("Export PNG…").clicked() {
                self.export_png();
            }
        });
    }

    fn controls_panel(&mut self, ui: &mut egui::Ui) {
        let size = self.scene.size();
        let controls = &mut self.scene.controls;

        ui.heading("Bones");
        ui.horizontal(|ui| {
            ui.radio_value(&mut controls.bone_style, BoneStyle::Ellipse, "Ellipse");
            ui.radio_value(&mut controls.bone_style, BoneStyle::Line, "Line");
        });
        ui.add(egui::Slider::new(&mut controls.bone_width, 1.0..=40.0).text("Bone width"));
        ui.add(egui::Slider::new(&mut controls.joint_diameter, 1.0..=40.0).text("Joint diameter"));
        if ui.button("Reset sizes").clicked() {
            controls.reset_sizes();
        }

        ui.separator();
        ui.heading("Mirror");
        ui.checkbox(&mut controls.mirror.horizontal, "Horizontal");
        ui.checkbox(&mut controls.mirror.vertical, "Vertical");

        ui.separator();
        ui.heading("Offset");
        ui.add(egui::Slider::new(&mut controls.offset[0], -size.x..=size.x).text("X"));
        ui.add(egui::Slider::new(&mut controls.offset[1], -size.y..=size.y).text("Y"));
        ui.add(
            egui::Slider::new(&mut controls.offset[2], OFFSET_Z_RANGE)
                .step_by(0.1)
                .text("Z"),
        );
        if ui.button("Reset offset").clicked() {
            controls.reset_offset();
        }

        ui.separator();
        ui.heading("Canvas");
        ui.horizontal(|ui| {
            ui.add(egui::DragValue::new(&mut self.canvas_input[0]).range(CANVAS_RANGE).prefix("w "));
            ui.add(egui::DragValue::new(&mut self.canvas_input[1]).range(CANVAS_RANGE).prefix("h "));
            if ui.button("Resize").clicked() {
                self.scene.resize(egui::vec2(self.canvas_input[0], self.canvas_input[1]));
            }
        });

        ui.separator();
        ui.heading("Pose JSON");
        ui.add(
            egui::TextEdit::multiline(&mut self.pose_text)
                .code_editor()
                .desired_rows(8)
                .desired_width(f32::INFINITY),
        );
        ui.horizontal(|ui| {
            if ui.button("Export").clicked() {
                self.pose_text = self.scene.export_pose();
            }
            if ui.button("Import").clicked() {
                self.import_text();
            }
        });
        ui.horizontal(|ui| {
            if ui.button("Copy").clicked() {
                self.copy_json(ui.ctx(), false, false);
            }
            if ui.button("Copy formatted").clicked() {
                self.copy_json(ui.ctx(), false, true);
            }
            if ui.button("Copy with colors").clicked() {
                self.copy_json(ui.ctx(), true, false);
            }
        });

        ui.separator();
        self.joint_table(ui);
    }

    fn joint_table(&self, ui: &mut egui::Ui) {
        let pose = self.scene.get_pose(false);
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto())
            .column(Column::remainder())
            .header(18.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Joint");
                });
                header.col(|ui| {
                    ui.strong("Position");
                });
            })
            .body(|mut body| {
                for (name, e) in pose.iter() {
                    body.row(16.0, |mut row| {
                        row.col(|ui| {
                            if self.scene.dragging() == Some(name) {
                                ui.strong(name);
                            } else {
                                ui.label(name);
                            }
                        });
                        row.col(|ui| {
                            ui.monospace(format!("{:>7}, {:>7}", e.x, e.y));
                        });
                    });
                }
            });
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(self.scene.size(), egui::Sense::click_and_drag());
        let rect = response.rect;
        let origin = rect.min.to_vec2();

        painter.rect_filled(rect, 0.0, egui::Color32::BLACK);

        if self.scene.overlay.displayable() {
            let fitted = self.scene.overlay.size();
            let img_rect = egui::Rect::from_min_size(
                rect.min + (self.scene.size() - fitted) / 2.0,
                fitted,
            );
            if let Some(tex) = self.scene.overlay.texture(ui.ctx()) {
                painter.image(
                    tex.id(),
                    img_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::from_rgba_unmultiplied(255, 255, 255, OVERLAY_ALPHA),
                );
            }
        }

        let pointer = ui.ctx().input(|i| i.pointer.latest_pos()).map(|p| p - origin);

        if response.drag_started_by(egui::PointerButton::Primary) {
            if let Some(p) = ui.ctx().input(|i| i.pointer.press_origin()) {
                self.scene.pressed(p - origin);
            }
        }
        if response.drag_stopped_by(egui::PointerButton::Primary) {
            self.scene.released();
        }

        self.scene.update(pointer);
        self.scene.show(&mut PainterCanvas { painter: &painter, origin });

        self.hovered = pointer
            .filter(|_| response.hovered() || self.scene.dragging().is_some())
            .and_then(|p| self.scene.hovered(p))
            .map(str::to_string);
    }
}

fn pose_dialog() -> rfd::FileDialog {
    rfd::FileDialog::new()
        .add_filter("Pose JSON", &["json"])
        .set_file_name("pose.json")
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for PoseEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(outcome) = self.scene.overlay.poll(self.scene.size()) {
            self.status = match outcome {
                Ok(()) => "Overlay loaded".into(),
                Err(e) => format!("Overlay failed: {e}"),
            };
        }
        if self.scene.overlay.is_loading() {
            ctx.request_repaint();
        }

        let (save, open) = ctx.input(|i| {
            (
                i.modifiers.command && i.key_pressed(egui::Key::S),
                i.modifiers.command && i.key_pressed(egui::Key::O),
            )
        });
        if save {
            self.save_pose();
        }
        if open {
            self.load_pose();
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui));

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.hovered.as_deref().unwrap_or("<hover over joint>"));
                ui.separator();
                ui.label(self.status.as_str());
            });
        });

        egui::SidePanel::right("controls")
            .default_width(280.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| self.controls_panel(ui));
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().show(ui, |ui| self.canvas(ui));
        });
    }
}
