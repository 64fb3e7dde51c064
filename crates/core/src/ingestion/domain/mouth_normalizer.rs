use super::detections::FaceDetection;
use crate::shared::landmark::{FacialFrame, FrameIndex, LandmarkPoint};

/// Converts inner-lip distance into a mouth-open ratio in `[0, 1]`.
///
/// The reference distance is the largest vertical lip gap seen so far in
/// the run, so early frames read as wider open than they would against the
/// full video. One normalizer is shared by every actor of a run.
#[derive(Debug, Default)]
pub struct MouthOpennessNormalizer {
    max_distance: f64,
}

impl MouthOpennessNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Largest vertical lip distance observed. Never decreases.
    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    pub fn ratio(&mut self, upper: Option<&LandmarkPoint>, lower: Option<&LandmarkPoint>) -> f64 {
        let (Some(upper), Some(lower)) = (upper, lower) else {
            return 0.0;
        };
        let vertical = (upper.y - lower.y).abs();
        if !vertical.is_finite() {
            return 0.0;
        }
        if vertical > self.max_distance {
            self.max_distance = vertical;
        }
        if self.max_distance > 0.0 {
            (vertical / self.max_distance).min(1.0)
        } else {
            0.0
        }
    }

    pub fn facial_frame(
        &mut self,
        frame: FrameIndex,
        timestamp: f64,
        face: &FaceDetection,
    ) -> FacialFrame {
        let (upper, lower) = face.lip_centers();
        let ratio = self.ratio(upper.as_ref(), lower.as_ref());
        FacialFrame::new(frame, timestamp, ratio)
            .with_lips(upper, lower)
            .with_mesh(face.mesh.clone())
    }
}
