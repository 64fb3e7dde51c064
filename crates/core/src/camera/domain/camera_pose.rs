use nalgebra::Vector3;

use crate::shared::constants::{DEFAULT_CAMERA_LOCATION, DEFAULT_CAMERA_ROTATION};
use crate::shared::keyframe::{KeyframeOp, KeyframeTarget, KeyframeValue};
use crate::shared::landmark::FrameIndex;

/// Camera location plus XYZ euler rotation in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub location: Vector3<f64>,
    pub rotation: Vector3<f64>,
}

impl CameraPose {
    pub fn new(location: [f64; 3], rotation: [f64; 3]) -> Self {
        Self {
            location: Vector3::from(location),
            rotation: Vector3::from(rotation),
        }
    }
}

impl Default for CameraPose {
    /// Three units behind the subject, raised and tilted down toward it.
    fn default() -> Self {
        Self::new(DEFAULT_CAMERA_LOCATION, DEFAULT_CAMERA_ROTATION)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraKeyframe {
    pub frame: FrameIndex,
    pub pose: CameraPose,
}

impl CameraKeyframe {
    pub fn to_op(&self) -> KeyframeOp {
        KeyframeOp {
            target: KeyframeTarget::Camera,
            frame: self.frame,
            value: KeyframeValue::camera(&self.pose.location, &self.pose.rotation),
        }
    }
}
