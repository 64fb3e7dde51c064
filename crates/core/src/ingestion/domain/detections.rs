use crate::shared::constants::{LOWER_LIP_CENTER_ID, UPPER_LIP_CENTER_ID};
use crate::shared::landmark::{FrameIndex, LandmarkPoint, SkeletalFrame};
use crate::shared::motion_sample::OpticalFlow;

/// One face as reported by the facial-landmark detector.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceDetection {
    pub upper_lip: Option<LandmarkPoint>,
    pub lower_lip: Option<LandmarkPoint>,
    pub mesh: Vec<LandmarkPoint>,
}

impl FaceDetection {
    /// Inner-lip centers, taken from the mesh when not given explicitly.
    pub fn lip_centers(&self) -> (Option<LandmarkPoint>, Option<LandmarkPoint>) {
        let upper = self
            .upper_lip
            .or_else(|| self.mesh.get(UPPER_LIP_CENTER_ID).copied());
        let lower = self
            .lower_lip
            .or_else(|| self.mesh.get(LOWER_LIP_CENTER_ID).copied());
        (upper, lower)
    }
}

/// Everything the detection collaborator reports for one decoded frame.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionFrame {
    pub frame: FrameIndex,
    pub timestamp: f64,
    pub skeletal: Vec<SkeletalFrame>,
    pub faces: Vec<FaceDetection>,
    pub flow: OpticalFlow,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh(len: usize) -> Vec<LandmarkPoint> {
        (0..len)
            .map(|i| LandmarkPoint::new(i as f64 * 0.01, i as f64 * 0.02, 0.0))
            .collect()
    }

    #[test]
    fn test_explicit_lips_win_over_mesh() {
        let upper = LandmarkPoint::new(0.5, 0.4, 0.0);
        let face = FaceDetection {
            upper_lip: Some(upper),
            lower_lip: None,
            mesh: mesh(468),
        };
        let (u, l) = face.lip_centers();
        assert_eq!(u, Some(upper));
        assert_eq!(l, Some(face.mesh[14]));
    }

    #[test]
    fn test_short_mesh_yields_no_lips() {
        let face = FaceDetection {
            mesh: mesh(5),
            ..Default::default()
        };
        assert_eq!(face.lip_centers(), (None, None));
    }
}
