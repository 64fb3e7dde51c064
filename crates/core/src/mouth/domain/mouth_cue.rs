use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::shared::error::MotionError;

/// Symbolic mouth-shape category from the lip-sync collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MouthShape {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    X,
}

impl MouthShape {
    pub const ALL: [MouthShape; 9] = [
        MouthShape::A,
        MouthShape::B,
        MouthShape::C,
        MouthShape::D,
        MouthShape::E,
        MouthShape::F,
        MouthShape::G,
        MouthShape::H,
        MouthShape::X,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for MouthShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl FromStr for MouthShape {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MouthShape::ALL
            .iter()
            .copied()
            .find(|shape| shape.to_string() == s)
            .ok_or_else(|| {
                MotionError::malformed("mouth cue value", "one of A-H or X", format!("'{s}'"))
            })
    }
}

impl Serialize for MouthShape {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MouthShape {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A shape held over `[start, end)` seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MouthCue {
    pub start: f64,
    pub end: f64,
    #[serde(rename = "value")]
    pub shape: MouthShape,
}

/// Openness ratio per mouth shape.
#[derive(Clone, Debug, PartialEq)]
pub struct MouthRatioTable {
    ratios: [f64; 9],
}

impl Default for MouthRatioTable {
    fn default() -> Self {
        let mut ratios = [0.0; 9];
        ratios[MouthShape::A.slot()] = 0.1;
        ratios[MouthShape::B.slot()] = 0.4;
        ratios[MouthShape::C.slot()] = 0.7;
        ratios[MouthShape::E.slot()] = 0.9;
        ratios[MouthShape::F.slot()] = 0.2;
        Self { ratios }
    }
}

impl MouthRatioTable {
    pub fn ratio(&self, shape: MouthShape) -> f64 {
        self.ratios[shape.slot()]
    }

    pub fn set(&mut self, shape: MouthShape, ratio: f64) {
        self.ratios[shape.slot()] = ratio;
    }

    /// Applies `letter → ratio` overrides from settings.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, f64>) -> Result<Self, MotionError> {
        for (letter, ratio) in overrides {
            let shape: MouthShape = letter.parse()?;
            if !(0.0..=1.0).contains(ratio) {
                return Err(MotionError::malformed(
                    format!("mouth_ratios.{letter}"),
                    "ratio in [0, 1]",
                    ratio.to_string(),
                ));
            }
            self.set(shape, *ratio);
        }
        Ok(self)
    }
}
