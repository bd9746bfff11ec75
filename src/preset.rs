//! Pose presets and the static bone table.
//!
//! Built-in presets ship in `assets/presets.json`, embedded at compile time.
//! A user presets file can extend or override them; every preset is
//! validated against [`BONES`] before a scene is built from it.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::color::Color;
use crate::error::{PoseError, Result};

pub const DEFAULT_PRESET: &str = "default";

#[derive(Clone, Copy, Debug)]
pub struct BoneDef {
    pub name: &'static str,
    pub start: &'static str,
    pub end: &'static str,
    pub color: Color,
}

const fn bone(name: &'static str, start: &'static str, end: &'static str, color: u32) -> BoneDef {
    BoneDef {
        name,
        start,
        end,
        color: Color::hex(color),
    }
}

pub const BONES: &[BoneDef] = &[
    bone("rWrist", "rWrist", "rElbow", 0x999900),
    bone("rElbow", "rElbow", "rShoulder", 0x996600),
    bone("rShoulder", "rShoulder", "upperChest", 0x990000),
    bone("rHip", "rHip", "upperChest", 0x009900),
    bone("rKnee", "rKnee", "rHip", 0x009933),
    bone("rAnkle", "rAnkle", "rKnee", 0x009966),
    bone("lWrist", "lWrist", "lElbow", 0x339900),
    bone("lElbow", "lElbow", "lShoulder", 0x669900),
    bone("lShoulder", "lShoulder", "upperChest", 0x993300),
    bone("lHip", "lHip", "upperChest", 0x009999),
    bone("lKnee", "lKnee", "lHip", 0x006699),
    bone("lAnkle", "lAnkle", "lKnee", 0x003399),
    bone("upperChest", "upperChest", "nose", 0x000099),
    bone("rHeadInner", "rHeadInner", "nose", 0x330099),
    bone("rHeadOuter", "rHeadOuter", "rHeadInner", 0x660099),
    bone("lHeadInner", "lHeadInner", "nose", 0x990099),
    bone("lHeadOuter", "lHeadOuter", "lHeadInner", 0x990066),
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointDef {
    pub name: String,
    /// Rest position relative to the canvas center.
    pub x: f32,
    pub y: f32,
    pub color: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default = "default_mirror_center")]
    pub mirror_center: String,
    pub joints: Vec<JointDef>,
}

fn default_mirror_center() -> String {
    "upperChest".to_string()
}

impl Preset {
    pub fn joint(&self, name: &str) -> Option<&JointDef> {
        self.joints.iter().find(|j| j.name == name)
    }

    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for j in &self.joints {
            if !names.insert(j.name.as_str()) {
                return Err(PoseError::invalid(&self.name, format!("duplicate joint `{}`", j.name)));
            }
        }
        for j in &self.joints {
            let Some(m) = &j.mirror else { continue };
            if *m == j.name {
                return Err(PoseError::invalid(&self.name, format!("joint `{m}` mirrors itself")));
            }
            let Some(partner) = self.joint(m) else {
                return Err(PoseError::invalid(
                    &self.name,
                    format!("joint `{}` mirrors unknown joint `{m}`", j.name),
                ));
            };
            if partner.mirror.as_deref() != Some(j.name.as_str()) {
                return Err(PoseError::invalid(
                    &self.name,
                    format!("joint `{}` mirrors `{m}`, which does not mirror it back", j.name),
                ));
            }
        }
        for b in BONES {
            for end in [b.start, b.end] {
                if !names.contains(end) {
                    return Err(PoseError::invalid(
                        &self.name,
                        format!("bone `{}` needs missing joint `{end}`", b.name),
                    ));
                }
            }
        }
        if !names.contains(self.mirror_center.as_str()) {
            return Err(PoseError::invalid(
                &self.name,
                format!("mirror center `{}` is not a joint", self.mirror_center),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize)]
struct PresetFile {
    presets: Vec<Preset>,
}

/// Ordered collection of validated presets.
#[derive(Clone, Debug)]
pub struct PresetLibrary {
    presets: Vec<Preset>,
}

impl PresetLibrary {
    pub fn builtin() -> Result<Self> {
        Self::from_json(include_str!("../assets/presets.json"))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: PresetFile = serde_json::from_str(json)?;
        let mut lib = Self { presets: Vec::new() };
        for preset in file.presets {
            lib.insert(preset)?;
        }
        Ok(lib)
    }

    /// Merge presets from a user file; same-named presets are replaced.
    pub fn extend_from_file(&mut self, path: &Path) -> Result<()> {
        let data = std::fs::read_to_string(path)?;
        let extra = Self::from_json(&data)?;
        for preset in extra.presets {
            log::info!("loaded preset `{}` from {}", preset.name, path.display());
            self.insert(preset)?;
        }
        Ok(())
    }

    pub fn insert(&mut self, preset: Preset) -> Result<()> {
        preset.validate()?;
        match self.presets.iter_mut().find(|p| p.name == preset.name) {
            Some(slot) => *slot = preset,
            None => self.presets.push(preset),
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Preset> {
        self.presets
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| PoseError::UnknownPreset(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|p| p.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_presets_validate() {
        let lib = PresetLibrary::builtin().unwrap();
        let names: Vec<_> = lib.names().collect();
        assert_eq!(names, ["default", "t-pose", "walking", "sitting"]);
        for name in names {
            assert_eq!(lib.get(name).unwrap().joints.len(), 18);
        }
    }

    #[test]
    fn mirror_pairs_are_symmetric_in_builtins() {
        let lib = PresetLibrary::builtin().unwrap();
        let preset = lib.get(DEFAULT_PRESET).unwrap();
        for j in &preset.joints {
            if let Some(m) = &j.mirror {
                let partner = preset.joint(m).unwrap();
                assert_eq!(partner.mirror.as_deref(), Some(j.name.as_str()));
            }
        }
    }

    #[test]
    fn unknown_preset_is_an_error() {
        let lib = PresetLibrary::builtin().unwrap();
        assert!(matches!(lib.get("handstand"), Err(PoseError::UnknownPreset(_))));
    }

    #[test]
    fn rejects_preset_missing_bone_endpoint() {
        let mut preset = PresetLibrary::builtin().unwrap().get(DEFAULT_PRESET).unwrap().clone();
        preset.joints.retain(|j| j.name != "lKnee");
        let err = preset.validate().unwrap_err();
        assert!(err.to_string().contains("lKnee"), "{err}");
    }

    #[test]
    fn rejects_dangling_mirror_and_duplicates() {
        let base = PresetLibrary::builtin().unwrap().get(DEFAULT_PRESET).unwrap().clone();

        let mut dangling = base.clone();
        dangling.joints[0].mirror = Some("tail".into());
        assert!(matches!(dangling.validate(), Err(PoseError::InvalidPreset { .. })));

        let mut dup = base;
        let first = dup.joints[0].clone();
        dup.joints.push(first);
        assert!(matches!(dup.validate(), Err(PoseError::InvalidPreset { .. })));
    }

    #[test]
    fn rejects_self_and_one_sided_mirrors() {
        let base = PresetLibrary::builtin().unwrap().get(DEFAULT_PRESET).unwrap().clone();

        let mut own = base.clone();
        own.joints[0].mirror = Some(own.joints[0].name.clone());
        let err = own.validate().unwrap_err();
        assert!(err.to_string().contains("mirrors itself"), "{err}");

        let mut one_sided = base;
        let r = one_sided.joints.iter().position(|j| j.name == "rKnee").unwrap();
        one_sided.joints[r].mirror = Some("lElbow".into());
        let err = one_sided.validate().unwrap_err();
        assert!(err.to_string().contains("does not mirror it back"), "{err}");
    }

    #[test]
    fn user_file_overrides_by_name() {
        let mut lib = PresetLibrary::builtin().unwrap();
        let mut custom = lib.get(DEFAULT_PRESET).unwrap().clone();
        custom.joints[0].x = 42.0;
        let json = serde_json::json!({ "presets": [custom] }).to_string();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets.json");
        std::fs::write(&path, json).unwrap();
        lib.extend_from_file(&path).unwrap();

        assert_eq!(lib.names().count(), 4);
        assert_eq!(lib.get(DEFAULT_PRESET).unwrap().joints[0].x, 42.0);
    }
}
