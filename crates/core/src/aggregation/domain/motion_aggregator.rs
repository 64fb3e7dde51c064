use chrono::{DateTime, Utc};

use super::actor_table::ActorTable;
use super::mission_dataset::{DatasetMetadata, MissionDataset, Transcription};
use crate::identity::domain::identity_assigner::FrameAssignment;
use crate::shared::error::MotionError;
use crate::shared::motion_sample::{CameraMotionSample, OpticalFlow};
use crate::shared::video_metadata::VideoMetadata;

/// Builds the dataset one frame at a time.
///
/// Frames must arrive as 0, 1, 2, ... with no gaps; each contributes exactly
/// one camera sample and any number of actor detections.
pub struct MotionAggregator {
    metadata: DatasetMetadata,
    camera_motion: Vec<CameraMotionSample>,
    actors: ActorTable,
}

impl MotionAggregator {
    pub fn new(video: &VideoMetadata, created_at: DateTime<Utc>) -> Self {
        Self {
            metadata: DatasetMetadata::from_video(video, created_at),
            camera_motion: Vec::with_capacity(video.total_frames),
            actors: ActorTable::new(),
        }
    }

    pub fn with_source_video(mut self, source: impl Into<String>) -> Self {
        self.metadata.source_video = Some(source.into());
        self
    }

    pub fn frames_appended(&self) -> usize {
        self.camera_motion.len()
    }

    pub fn append(
        &mut self,
        assignment: FrameAssignment,
        timestamp: f64,
        flow: OpticalFlow,
    ) -> Result<(), MotionError> {
        let expected = self.camera_motion.len();
        if assignment.frame != expected {
            return Err(MotionError::malformed(
                "camera_motion",
                format!("frame {expected}"),
                format!("frame {}", assignment.frame),
            ));
        }

        self.metadata.max_actors_detected = self
            .metadata
            .max_actors_detected
            .max(assignment.actor_count());

        for (id, pose) in assignment.skeletal {
            self.actors.get_or_create(id).pose_frames.push(pose);
        }
        for (id, mouth) in assignment.facial {
            let frames = &mut self.actors.get_or_create(id).mouth_frames;
            // One mouth sample per actor and frame; a later face replaces it.
            match frames.last_mut() {
                Some(last) if last.frame() == mouth.frame() => {
                    log::debug!(
                        "Frame {}: second face for actor {id} replaces the first",
                        mouth.frame()
                    );
                    *last = mouth;
                }
                _ => frames.push(mouth),
            }
        }

        self.camera_motion.push(CameraMotionSample {
            frame: assignment.frame,
            timestamp,
            flow,
        });
        Ok(())
    }

    /// Closes the dataset. `total_frames` and the duration reflect the frames
    /// actually appended when the source under-reported them.
    pub fn finish(mut self, transcription: Option<Transcription>) -> MissionDataset {
        let appended = self.camera_motion.len();
        if appended != self.metadata.total_frames {
            log::warn!(
                "Source announced {} frames but {} were appended",
                self.metadata.total_frames,
                appended
            );
            self.metadata.total_frames = appended;
            self.metadata.duration_seconds = self.metadata.video().duration_seconds();
        }
        MissionDataset {
            metadata: self.metadata,
            camera_motion: self.camera_motion,
            actors: self.actors,
            transcription,
        }
    }
}
