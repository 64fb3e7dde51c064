use nalgebra::{Unit, UnitVector3, Vector3};

const MIN_REST_LENGTH: f64 = 1e-12;

/// A target-skeleton bone and the direction it points at rest.
#[derive(Clone, Debug, PartialEq)]
pub struct Bone {
    name: String,
    rest_direction: UnitVector3<f64>,
}

impl Bone {
    pub fn from_head_tail(name: impl Into<String>, head: Vector3<f64>, tail: Vector3<f64>) -> Self {
        Self::from_direction(name, tail - head)
    }

    /// Zero-length directions fall back to +Y.
    pub fn from_direction(name: impl Into<String>, direction: Vector3<f64>) -> Self {
        let rest_direction =
            Unit::try_new(direction, MIN_REST_LENGTH).unwrap_or_else(Vector3::y_axis);
        Self {
            name: name.into(),
            rest_direction,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rest_direction(&self) -> &UnitVector3<f64> {
        &self.rest_direction
    }
}

/// An externally supplied articulated skeleton.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetSkeleton {
    name: String,
    bones: Vec<Bone>,
}

impl TargetSkeleton {
    pub fn new(name: impl Into<String>, bones: Vec<Bone>) -> Self {
        Self {
            name: name.into(),
            bones,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rest_direction_is_normalized() {
        let bone = Bone::from_head_tail("Spine", Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, 3.0));
        assert_relative_eq!(bone.rest_direction().into_inner(), Vector3::z());
    }

    #[test]
    fn test_zero_length_falls_back_to_up() {
        let p = Vector3::new(0.2, 0.3, 0.4);
        let bone = Bone::from_head_tail("Stub", p, p);
        assert_eq!(bone.rest_direction().into_inner(), Vector3::y());
    }
}
