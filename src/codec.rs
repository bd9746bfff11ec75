//! Pose JSON: joint name to `[x, y]` relative to the canvas center.

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::color::Color;
use crate::error::Result;

/// Round to the nearest tenth, halves rounding up.
pub fn round1d(v: f32) -> f64 {
    ((v as f64) * 10.0 + 0.5).floor() / 10.0
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseEntry {
    pub x: f64,
    pub y: f64,
    pub color: Option<Color>,
}

/// Joint coordinates in skeleton order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pose {
    entries: Vec<(String, PoseEntry)>,
}

impl Pose {
    pub fn push(&mut self, name: impl Into<String>, entry: PoseEntry) {
        self.entries.push((name.into(), entry));
    }

    pub fn get(&self, name: &str) -> Option<&PoseEntry> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, e)| e)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PoseEntry)> {
        self.entries.iter().map(|(n, e)| (n.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self, formatted: bool) -> Result<String> {
        Ok(if formatted {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        })
    }

    /// Two joints per line, for the pose text box.
    pub fn to_export_text(&self) -> String {
        let items: Vec<String> = self
            .entries
            .iter()
            .map(|(name, e)| format!("\"{name}\": [{}, {}]", e.x, e.y))
            .collect();
        let lines: Vec<String> = items.chunks(2).map(|pair| pair.join(", ")).collect();
        format!("{{{}}}", lines.join(",\n"))
    }
}

/// Coordinates end up as `f32` canvas positions.
fn finite_f32(v: f64) -> bool {
    v.is_finite() && v.abs() <= f32::MAX as f64
}

struct Coord(f64);

impl Serialize for Coord {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        if self.0.fract() == 0.0 && self.0.abs() < i64::MAX as f64 {
            s.serialize_i64(self.0 as i64)
        } else {
            s.serialize_f64(self.0)
        }
    }
}

impl Serialize for PoseEntry {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = s.serialize_seq(Some(if self.color.is_some() { 3 } else { 2 }))?;
        seq.serialize_element(&Coord(self.x))?;
        seq.serialize_element(&Coord(self.y))?;
        if let Some(c) = self.color {
            seq.serialize_element(&c)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for PoseEntry {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        struct EntryVisitor;

        impl<'de> Visitor<'de> for EntryVisitor {
            type Value = PoseEntry;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an [x, y] or [x, y, color] array")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<PoseEntry, A::Error> {
                let x = seq.next_element()?.ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let y = seq.next_element()?.ok_or_else(|| de::Error::invalid_length(1, &self))?;
                for v in [x, y] {
                    if !finite_f32(v) {
                        return Err(de::Error::custom(format!("coordinate {v} is out of range")));
                    }
                }
                let color = seq.next_element()?;
                if seq.next_element::<de::IgnoredAny>()?.is_some() {
                    return Err(de::Error::invalid_length(4, &self));
                }
                Ok(PoseEntry { x, y, color })
            }
        }

        d.deserialize_seq(EntryVisitor)
    }
}

impl Serialize for Pose {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_map(self.entries.iter().map(|(n, e)| (n, e)))
    }
}

impl<'de> Deserialize<'de> for Pose {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        struct PoseVisitor;

        impl<'de> Visitor<'de> for PoseVisitor {
            type Value = Pose;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping joint names to coordinates")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Pose, A::Error> {
                let mut pose = Pose::default();
                while let Some((name, entry)) = map.next_entry::<String, PoseEntry>()? {
                    pose.push(name, entry);
                }
                Ok(pose)
            }
        }

        d.deserialize_map(PoseVisitor)
    }
}
