use std::path::Path;

use super::detections::DetectionFrame;
use crate::shared::error::MotionError;
use crate::shared::video_metadata::VideoMetadata;

/// Supplies per-frame detections produced by an external detector.
///
/// Implementations only translate the collaborator's format; they keep no
/// identity or normalization state.
pub trait LandmarkSource: Send {
    /// Opens the detection stream and returns the source video's metadata.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, MotionError>;

    /// Returns detections in frame order.
    fn frames(&mut self) -> Box<dyn Iterator<Item = Result<DetectionFrame, MotionError>> + '_>;

    /// Releases any resources held by the source.
    fn close(&mut self);
}
