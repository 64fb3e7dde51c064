use nalgebra::{UnitQuaternion, Vector3};
use serde::Serialize;

use super::actor_id::ActorId;
use super::landmark::FrameIndex;

/// What a keyframe animates on the rendering side.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KeyframeTarget {
    Camera,
    Bone { actor: ActorId, bone: String },
    MouthControl { actor: ActorId },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyframeValue {
    CameraTransform {
        location: [f64; 3],
        rotation_euler: [f64; 3],
    },
    /// Quaternion as `[w, x, y, z]`.
    Rotation { quaternion: [f64; 4] },
    Scalar(f64),
}

impl KeyframeValue {
    pub fn camera(location: &Vector3<f64>, rotation_euler: &Vector3<f64>) -> Self {
        KeyframeValue::CameraTransform {
            location: [location.x, location.y, location.z],
            rotation_euler: [rotation_euler.x, rotation_euler.y, rotation_euler.z],
        }
    }

    pub fn rotation(q: &UnitQuaternion<f64>) -> Self {
        KeyframeValue::Rotation {
            quaternion: [q.w, q.i, q.j, q.k],
        }
    }
}

/// A single keyframe-insert operation handed to the rendering collaborator.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct KeyframeOp {
    pub target: KeyframeTarget,
    pub frame: FrameIndex,
    pub value: KeyframeValue,
}
