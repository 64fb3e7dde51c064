use super::error::MotionError;

/// Properties of the decoded source video, as reported by the detection collaborator.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
}

impl VideoMetadata {
    pub fn duration_seconds(&self) -> f64 {
        if self.fps > 0.0 {
            self.total_frames as f64 / self.fps
        } else {
            0.0
        }
    }

    /// Seconds from video start for a frame index.
    pub fn timestamp_of(&self, frame: usize) -> f64 {
        if self.fps > 0.0 {
            frame as f64 / self.fps
        } else {
            0.0
        }
    }

    pub fn validate(&self) -> Result<(), MotionError> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(MotionError::malformed("fps", "fps > 0", self.fps.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn meta(fps: f64, total_frames: usize) -> VideoMetadata {
        VideoMetadata {
            width: 1920,
            height: 1080,
            fps,
            total_frames,
        }
    }

    #[test]
    fn test_duration() {
        assert_relative_eq!(meta(30.0, 900).duration_seconds(), 30.0);
    }

    #[test]
    fn test_timestamp_of_frame() {
        assert_relative_eq!(meta(25.0, 100).timestamp_of(50), 2.0);
    }

    #[test]
    fn test_zero_fps_is_rejected() {
        assert!(meta(0.0, 10).validate().is_err());
        assert_relative_eq!(meta(0.0, 10).duration_seconds(), 0.0);
    }

    #[test]
    fn test_positive_fps_is_accepted() {
        assert!(meta(59.94, 10).validate().is_ok());
    }
}
