use eframe::egui::{pos2, vec2, Pos2, Vec2};
use pose_edit::preset::DEFAULT_PRESET;
use pose_edit::{BoneStyle, Canvas, Color, PoseError, PresetLibrary, Scene};

#[derive(Default)]
struct Recorder {
    lines: usize,
    ellipses: usize,
    circles: Vec<(Pos2, f32, Color)>,
}

impl Canvas for Recorder {
    fn line(&mut self, _: Pos2, _: Pos2, _: f32, _: Color) {
        self.lines += 1;
    }
    fn ellipse(&mut self, _: Pos2, _: Vec2, _: f32, _: Color) {
        self.ellipses += 1;
    }
    fn circle(&mut self, center: Pos2, radius: f32, color: Color) {
        self.circles.push((center, radius, color));
    }
}

fn scene(preset: &str) -> Scene {
    let lib = PresetLibrary::builtin().unwrap();
    Scene::new(lib.get(preset).unwrap(), vec2(800.0, 600.0)).unwrap()
}

fn pos(scene: &Scene, name: &str) -> Pos2 {
    scene.joint(name).unwrap().pos
}

#[test]
fn drag_follows_pointer_minus_grab_offset() {
    let mut s = scene(DEFAULT_PRESET);
    let start = s.joint("lKnee").unwrap().rendered();
    let grab_at = start + vec2(1.5, -2.0);
    assert_eq!(s.pressed(grab_at), Some("lKnee"));

    for step in [vec2(5.0, 0.0), vec2(20.0, 30.0), vec2(42.0, 17.0)] {
        s.update(Some(grab_at + step));
        assert_eq!(pos(&s, "lKnee"), start + step);
    }
    s.released();
    assert!(s.dragging().is_none());

    // Pointer movement after release no longer moves the joint.
    s.update(Some(pos2(10.0, 10.0)));
    assert_eq!(pos(&s, "lKnee"), start + vec2(42.0, 17.0));
}

#[test]
fn press_on_empty_canvas_grabs_nothing() {
    let mut s = scene(DEFAULT_PRESET);
    assert_eq!(s.pressed(pos2(5.0, 5.0)), None);
    s.update(Some(pos2(50.0, 50.0)));
    assert_eq!(s.get_pose(false), scene(DEFAULT_PRESET).get_pose(false));
}

#[test]
fn hit_test_center_and_outside_radius() {
    let mut s = scene(DEFAULT_PRESET);
    s.controls.joint_diameter = 12.0;
    s.update(None);
    let nose = s.joint("nose").unwrap();
    assert!(nose.is_over(nose.rendered()));
    assert!(!nose.is_over(nose.rendered() + vec2(6.01, 0.0)));
    assert_eq!(s.hovered(nose.rendered()), Some("nose"));
    assert_eq!(s.hovered(pos2(0.0, 0.0)), None);
}

#[test]
fn export_then_import_round_trips() {
    let mut s = scene(DEFAULT_PRESET);
    let start = s.joint("upperChest").unwrap().rendered();
    s.pressed(start);
    s.update(Some(start + vec2(3.33, -7.77)));
    s.released();

    let before: Vec<Pos2> = s.joints().iter().map(|j| j.pos).collect();
    for text in [
        s.get_pose(false).to_json(false).unwrap(),
        s.get_pose(false).to_json(true).unwrap(),
        s.export_pose(),
    ] {
        let mut fresh = scene(DEFAULT_PRESET);
        let summary = fresh.import_pose(&text).unwrap();
        assert_eq!(summary.applied, before.len());
        for (j, b) in fresh.joints().iter().zip(&before) {
            assert!((j.pos - *b).length() <= 0.1, "{} drifted: {:?} vs {:?}", j.name, j.pos, b);
        }
    }
}

#[test]
fn upper_chest_survives_export_import_on_800x600() {
    let mut s = scene(DEFAULT_PRESET);
    let exported = s.get_pose(false).to_json(false).unwrap();
    assert!(exported.contains(r#""upperChest":[0,-110]"#), "{exported}");
    s.import_pose(&exported).unwrap();
    assert_eq!(s.get_pose(false).to_json(false).unwrap(), exported);
    assert_eq!(pos(&s, "upperChest"), pos2(400.0, 190.0));
}

#[test]
fn malformed_import_is_a_parse_error() {
    let mut s = scene(DEFAULT_PRESET);
    let err = s.import_pose("{not json").unwrap_err();
    assert!(matches!(err, PoseError::Parse(_)));
}

#[test]
fn horizontal_and_vertical_mirror() {
    for (h, v, expect) in [
        (true, false, vec2(-12.0, 9.0)),
        (false, true, vec2(12.0, -9.0)),
        (true, true, vec2(-12.0, -9.0)),
    ] {
        let mut s = scene(DEFAULT_PRESET);
        s.controls.mirror.horizontal = h;
        s.controls.mirror.vertical = v;
        let rest = pos(&s, "rAnkle");
        let start = s.joint("lAnkle").unwrap().rendered();
        s.pressed(start);
        s.update(Some(start + vec2(12.0, 9.0)));
        s.released();
        assert_eq!(pos(&s, "rAnkle"), rest + expect);
    }
}

#[test]
fn resize_preserves_layout_relative_to_center() {
    let mut s = scene("walking");
    let rel = |s: &Scene| -> Vec<Vec2> { s.joints().iter().map(|j| j.pos - s.center()).collect() };
    let before = rel(&s);
    s.resize(vec2(1000.0, 700.0));
    assert_eq!(s.center(), pos2(500.0, 350.0));
    assert_eq!(rel(&s), before);
}

#[test]
fn preset_switch_restores_exact_rest_positions() {
    let lib = PresetLibrary::builtin().unwrap();
    let mut s = scene(DEFAULT_PRESET);
    s.controls.offset = [25.0, -10.0, 2.0];
    let start = s.joint("rWrist").unwrap().rendered();
    s.pressed(start);

    for name in ["t-pose", "sitting", DEFAULT_PRESET] {
        let preset = lib.get(name).unwrap();
        s.switch_preset(preset).unwrap();
        assert_eq!(s.controls.offset, [0.0; 3]);
        assert!(s.dragging().is_none());
        for def in &preset.joints {
            assert_eq!(pos(&s, &def.name), s.center() + vec2(def.x, def.y), "{name}/{}", def.name);
        }
    }
}

#[test]
fn offset_shifts_rendering_not_export() {
    let mut s = scene(DEFAULT_PRESET);
    let pose = s.get_pose(false);
    s.controls.offset = [30.0, 20.0, 0.0];
    s.update(None);
    let nose = s.joint("nose").unwrap();
    assert_eq!(nose.rendered(), nose.pos + vec2(30.0, -20.0));
    assert_eq!(s.get_pose(false), pose);
}

#[test]
fn show_draws_every_bone_and_joint() {
    let mut s = scene(DEFAULT_PRESET);
    let mut rec = Recorder::default();
    s.show(&mut rec);
    assert_eq!(rec.ellipses, s.bones().len());
    assert_eq!(rec.lines, 0);
    assert_eq!(rec.circles.len(), 18);

    s.controls.bone_style = BoneStyle::Line;
    s.controls.offset[2] = 5.0;
    s.update(None);
    let mut rec = Recorder::default();
    s.show(&mut rec);
    assert_eq!(rec.lines, s.bones().len());
    let (_, radius, color) = rec.circles[0];
    assert_eq!(radius, 6.0);
    assert_eq!(color, Color::hex(0xff0000));
}

#[test]
fn reset_pose_undoes_drags_and_offset() {
    let mut s = scene(DEFAULT_PRESET);
    let rest = s.get_pose(false);
    let start = s.joint("nose").unwrap().rendered();
    s.pressed(start);
    s.update(Some(start + vec2(40.0, 40.0)));
    s.released();
    s.controls.offset = [5.0, 5.0, 0.0];
    s.reset_pose();
    assert_eq!(s.get_pose(false), rest);
    assert_eq!(s.controls.offset, [0.0; 3]);
}

#[test]
fn far_away_joint_renders_in_canvas_time() {
    let mut s = scene(DEFAULT_PRESET);
    s.import_pose(r#"{"nose": [200000, 0], "rAnkle": [-150000, 90000]}"#).unwrap();
    let started = std::time::Instant::now();
    let img = s.render_image();
    assert!(started.elapsed() < std::time::Duration::from_secs(5), "render took {:?}", started.elapsed());
    assert_eq!(img.dimensions(), (800, 600));
    let chest = s.joint("upperChest").unwrap().rendered();
    assert_ne!(img.get_pixel(chest.x as u32, chest.y as u32).0, [0, 0, 0, 255]);
}

#[test]
fn out_of_range_coordinates_are_rejected_without_changes() {
    let mut s = scene(DEFAULT_PRESET);
    let before = s.get_pose(false);
    for text in [r#"{"nose": [1e39, 0]}"#, r#"{"nose": [0, -1e300]}"#] {
        assert!(matches!(s.import_pose(text), Err(PoseError::Parse(_))), "{text}");
    }
    assert_eq!(s.get_pose(false), before);
}
