use chrono::{DateTime, Utc};

use super::actor_table::ActorTable;
use crate::shared::landmark::FrameIndex;
use crate::shared::motion_sample::CameraMotionSample;
use crate::shared::video_metadata::VideoMetadata;

#[derive(Clone, Debug, PartialEq)]
pub struct DatasetMetadata {
    pub session_id: String,
    pub source_video: Option<String>,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    pub total_frames: usize,
    pub duration_seconds: f64,
    pub created_at: DateTime<Utc>,
    pub max_actors_detected: usize,
}

impl DatasetMetadata {
    pub fn from_video(video: &VideoMetadata, created_at: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id_for(created_at),
            source_video: None,
            fps: video.fps,
            width: video.width,
            height: video.height,
            total_frames: video.total_frames,
            duration_seconds: video.duration_seconds(),
            created_at,
            max_actors_detected: 0,
        }
    }

    pub fn video(&self) -> VideoMetadata {
        VideoMetadata {
            width: self.width,
            height: self.height,
            fps: self.fps,
            total_frames: self.total_frames,
        }
    }
}

/// `SESSION_<yyyymmdd_HHMMSS>` in UTC.
pub fn session_id_for(created_at: DateTime<Utc>) -> String {
    format!("SESSION_{}", created_at.format("%Y%m%d_%H%M%S"))
}

/// Speech recognized over the whole video by the transcription collaborator.
#[derive(Clone, Debug, PartialEq)]
pub struct Transcription {
    pub text: String,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

/// The canonical per-video record: camera motion for every frame and the
/// motion of every actor seen.
#[derive(Clone, Debug, PartialEq)]
pub struct MissionDataset {
    pub metadata: DatasetMetadata,
    pub camera_motion: Vec<CameraMotionSample>,
    pub actors: ActorTable,
    pub transcription: Option<Transcription>,
}

impl MissionDataset {
    pub fn frame_count(&self) -> usize {
        self.camera_motion.len()
    }

    /// Whether `frame` lies inside the recorded camera range.
    pub fn covers(&self, frame: FrameIndex) -> bool {
        frame < self.camera_motion.len()
    }
}
