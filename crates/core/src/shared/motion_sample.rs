use std::f64::consts::TAU;

use super::error::MotionError;
use super::landmark::FrameIndex;

/// Frame-to-frame apparent motion summary.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct OpticalFlow {
    pub magnitude: f64,
    /// Mean flow angle in radians, `[0, 2π)`.
    pub angle: f64,
    /// Sparse `(dx, dy)` samples of the flow field.
    pub vectors: Vec<[f64; 2]>,
}

impl OpticalFlow {
    pub fn new(magnitude: f64, angle: f64, vectors: Vec<[f64; 2]>) -> Self {
        Self {
            magnitude,
            angle,
            vectors,
        }
    }

    /// No motion: what the first frame of a video reports.
    pub fn still() -> Self {
        Self::default()
    }

    /// Mean of the sampled vector field, `(0, 0)` when empty.
    pub fn mean_vector(&self) -> (f64, f64) {
        if self.vectors.is_empty() {
            return (0.0, 0.0);
        }
        let n = self.vectors.len() as f64;
        let (sx, sy) = self
            .vectors
            .iter()
            .fold((0.0, 0.0), |(sx, sy), v| (sx + v[0], sy + v[1]));
        (sx / n, sy / n)
    }

    /// Keeps every k-th vector so that at most `max` remain.
    pub fn decimated(mut self, max: usize) -> Self {
        if max == 0 {
            self.vectors.clear();
        } else if self.vectors.len() > max {
            let stride = self.vectors.len().div_ceil(max);
            self.vectors = self.vectors.into_iter().step_by(stride).collect();
        }
        self
    }

    pub fn validate(&self, location: &str) -> Result<(), MotionError> {
        if !(self.magnitude.is_finite() && self.magnitude >= 0.0) {
            return Err(MotionError::malformed(
                format!("{location}.magnitude"),
                "magnitude >= 0",
                self.magnitude.to_string(),
            ));
        }
        if !(self.angle >= 0.0 && self.angle < TAU) {
            return Err(MotionError::malformed(
                format!("{location}.angle"),
                "angle in [0, 2π)",
                self.angle.to_string(),
            ));
        }
        Ok(())
    }
}

/// Camera motion evidence for exactly one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraMotionSample {
    pub frame: FrameIndex,
    pub timestamp: f64,
    pub flow: OpticalFlow,
}
