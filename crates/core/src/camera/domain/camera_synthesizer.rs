use std::f64::consts::PI;

use nalgebra::Vector3;

use super::camera_pose::{CameraKeyframe, CameraPose};
use crate::shared::error::MotionError;
use crate::shared::landmark::FrameIndex;
use crate::shared::motion_sample::CameraMotionSample;

/// Flow-vector units to scene units for the X/Y drift.
pub const TRANSLATION_SCALE: f64 = 0.1;
/// Flow magnitude to scene units for the Z push.
pub const DEPTH_SCALE: f64 = 0.01;
pub const PAN_SCALE: f64 = 0.05;
pub const TILT_SCALE: f64 = 0.02;
/// Fraction of each rotation delta that reaches the accumulator.
pub const ROTATION_SMOOTHING: f64 = 0.1;

/// Running camera offsets. Starts at zero and only ever accumulates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CameraAccumulator {
    offset: Vector3<f64>,
    pan: f64,
    tilt: f64,
    last_frame: Option<FrameIndex>,
}

impl CameraAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> Vector3<f64> {
        self.offset
    }

    pub fn pan(&self) -> f64 {
        self.pan
    }

    pub fn tilt(&self) -> f64 {
        self.tilt
    }

    pub fn advance(
        &mut self,
        sample: &CameraMotionSample,
        intensity: f64,
    ) -> Result<(), MotionError> {
        if let Some(last) = self.last_frame {
            if sample.frame <= last {
                return Err(MotionError::malformed(
                    "camera_motion",
                    format!("frame > {last}"),
                    sample.frame.to_string(),
                ));
            }
        }
        self.last_frame = Some(sample.frame);

        let flow = &sample.flow;
        let (mean_x, mean_y) = flow.mean_vector();
        self.offset.x += mean_x * intensity * TRANSLATION_SCALE;
        self.offset.y += mean_y * intensity * TRANSLATION_SCALE;
        self.offset.z += flow.magnitude * intensity * DEPTH_SCALE;

        let pan_delta = (flow.angle - PI) * intensity * PAN_SCALE;
        let tilt_delta = flow.magnitude * intensity * TILT_SCALE;
        self.pan += pan_delta * ROTATION_SMOOTHING;
        self.tilt += tilt_delta * ROTATION_SMOOTHING;
        Ok(())
    }

    /// `base` moved by the accumulated offsets. Pan turns about euler X,
    /// tilt about euler Y; euler Z is left at the base value.
    pub fn pose_from(&self, base: &CameraPose) -> CameraPose {
        CameraPose {
            location: base.location + self.offset,
            rotation: Vector3::new(
                base.rotation.x + self.pan,
                base.rotation.y + self.tilt,
                base.rotation.z,
            ),
        }
    }
}

/// Turns recorded optical flow into a camera path.
///
/// The output depends only on the samples, the intensity and the base pose,
/// so re-running a variant reproduces it exactly.
#[derive(Clone, Debug, Default)]
pub struct CameraMotionSynthesizer {
    base: CameraPose,
}

impl CameraMotionSynthesizer {
    pub fn new(base: CameraPose) -> Self {
        Self { base }
    }

    pub fn synthesize(
        &self,
        samples: &[CameraMotionSample],
        intensity: f64,
    ) -> Result<Vec<CameraKeyframe>, MotionError> {
        if samples.is_empty() {
            log::warn!("No camera motion samples; camera stays static");
            return Ok(Vec::new());
        }

        let mut accumulator = CameraAccumulator::new();
        let mut keyframes = Vec::with_capacity(samples.len());
        for sample in samples {
            accumulator.advance(sample, intensity)?;
            keyframes.push(CameraKeyframe {
                frame: sample.frame,
                pose: accumulator.pose_from(&self.base),
            });
        }
        log::debug!(
            "Camera path: {} keyframes at intensity {intensity}",
            keyframes.len()
        );
        Ok(keyframes)
    }
}
