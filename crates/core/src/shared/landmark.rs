use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::constants::{POSE_ANCHOR_LANDMARK, POSE_LANDMARK_COUNT};
use super::error::MotionError;

/// Zero-based index of a decoded frame.
pub type FrameIndex = usize;

/// A normalized anatomical point, optionally carrying detector confidence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl LandmarkPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            visibility: None,
        }
    }

    pub fn with_visibility(mut self, visibility: f64) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Confidence used for thresholding. Absent confidence counts as 0.
    pub fn confidence(&self) -> f64 {
        self.visibility.unwrap_or(0.0)
    }
}

/// One subject's 33 body landmarks at one frame.
///
/// Landmark IDs are positional: `landmarks()[i]` is landmark `i`.
#[derive(Clone, Debug, PartialEq)]
pub struct SkeletalFrame {
    frame: FrameIndex,
    timestamp: f64,
    landmarks: Vec<LandmarkPoint>,
}

impl SkeletalFrame {
    pub fn new(
        frame: FrameIndex,
        timestamp: f64,
        landmarks: Vec<LandmarkPoint>,
    ) -> Result<Self, MotionError> {
        if landmarks.len() != POSE_LANDMARK_COUNT {
            return Err(MotionError::malformed(
                format!("frame {frame} pose landmarks"),
                format!("{POSE_LANDMARK_COUNT} landmarks"),
                landmarks.len().to_string(),
            ));
        }
        Ok(Self {
            frame,
            timestamp,
            landmarks,
        })
    }

    pub fn frame(&self) -> FrameIndex {
        self.frame
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn landmarks(&self) -> &[LandmarkPoint] {
        &self.landmarks
    }

    pub fn landmark(&self, id: usize) -> Option<&LandmarkPoint> {
        self.landmarks.get(id)
    }

    /// Horizontal anchor used for left-to-right ranking.
    pub fn anchor_x(&self) -> f64 {
        self.landmarks[POSE_ANCHOR_LANDMARK].x
    }
}

/// Mouth state of one face at one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FacialFrame {
    frame: FrameIndex,
    timestamp: f64,
    mouth_open_ratio: f64,
    upper_lip: Option<LandmarkPoint>,
    lower_lip: Option<LandmarkPoint>,
    mesh: Vec<LandmarkPoint>,
}

impl FacialFrame {
    pub fn new(frame: FrameIndex, timestamp: f64, mouth_open_ratio: f64) -> Self {
        debug_assert!(
            (0.0..=1.0).contains(&mouth_open_ratio),
            "mouth_open_ratio must be within [0, 1]"
        );
        Self {
            frame,
            timestamp,
            mouth_open_ratio,
            upper_lip: None,
            lower_lip: None,
            mesh: Vec::new(),
        }
    }

    pub fn with_lips(
        mut self,
        upper_lip: Option<LandmarkPoint>,
        lower_lip: Option<LandmarkPoint>,
    ) -> Self {
        self.upper_lip = upper_lip;
        self.lower_lip = lower_lip;
        self
    }

    pub fn with_mesh(mut self, mesh: Vec<LandmarkPoint>) -> Self {
        self.mesh = mesh;
        self
    }

    pub fn frame(&self) -> FrameIndex {
        self.frame
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn mouth_open_ratio(&self) -> f64 {
        self.mouth_open_ratio
    }

    pub fn upper_lip(&self) -> Option<&LandmarkPoint> {
        self.upper_lip.as_ref()
    }

    pub fn lower_lip(&self) -> Option<&LandmarkPoint> {
        self.lower_lip.as_ref()
    }

    pub fn mesh(&self) -> &[LandmarkPoint] {
        &self.mesh
    }

    /// Horizontal anchor: lip midpoint, else whichever lip is present,
    /// else the first mesh point. `None` when the face has no usable point.
    pub fn anchor_x(&self) -> Option<f64> {
        match (&self.upper_lip, &self.lower_lip) {
            (Some(upper), Some(lower)) => Some((upper.x + lower.x) / 2.0),
            (Some(lip), None) | (None, Some(lip)) => Some(lip.x),
            (None, None) => self.mesh.first().map(|p| p.x),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// 33 fully visible landmarks with the nose at `anchor_x`.
    pub fn pose_landmarks(anchor_x: f64) -> Vec<LandmarkPoint> {
        (0..POSE_LANDMARK_COUNT)
            .map(|i| {
                let x = if i == POSE_ANCHOR_LANDMARK {
                    anchor_x
                } else {
                    anchor_x + 0.001 * i as f64
                };
                LandmarkPoint::new(x, 0.01 * i as f64, 0.0).with_visibility(1.0)
            })
            .collect()
    }

    pub fn skeletal(frame: FrameIndex, anchor_x: f64) -> SkeletalFrame {
        SkeletalFrame::new(frame, frame as f64 / 30.0, pose_landmarks(anchor_x)).unwrap()
    }
}
