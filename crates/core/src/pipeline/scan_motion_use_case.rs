use std::path::Path;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use crossbeam_channel::RecvTimeoutError;

use crate::aggregation::domain::mission_dataset::{MissionDataset, Transcription};
use crate::aggregation::domain::motion_aggregator::MotionAggregator;
use crate::identity::domain::identity_assigner::IdentityAssigner;
use crate::ingestion::domain::landmark_source::LandmarkSource;
use crate::ingestion::domain::mouth_normalizer::MouthOpennessNormalizer;
use crate::shared::error::MotionError;

use super::infrastructure::source_reader_thread::spawn_source_reader;
use super::pipeline_logger::PipelineLogger;

const DEFAULT_CHANNEL_CAPACITY: usize = 16;
const SOURCE_TOOL: &str = "landmark source";

/// Turns a detection stream into a mission dataset.
///
/// Layout: `reader thread → channel → main [normalize → assign → aggregate]`.
/// Everything after the channel is strictly sequential in frame order. With a
/// timeout set, a source that goes quiet abandons the whole scan; no partial
/// dataset is returned.
pub struct ScanMotionUseCase {
    source: Box<dyn LandmarkSource>,
    assigner: Box<dyn IdentityAssigner>,
    logger: Box<dyn PipelineLogger>,
    timeout: Option<Duration>,
    channel_capacity: usize,
    transcription: Option<Transcription>,
}

impl ScanMotionUseCase {
    pub fn new(
        source: Box<dyn LandmarkSource>,
        assigner: Box<dyn IdentityAssigner>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            source,
            assigner,
            logger,
            timeout: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            transcription: None,
        }
    }

    /// Longest wait for the next frame before giving up on the source.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_transcription(mut self, transcription: Option<Transcription>) -> Self {
        self.transcription = transcription;
        self
    }

    pub fn execute(
        mut self,
        input: &Path,
        created_at: DateTime<Utc>,
    ) -> Result<MissionDataset, MotionError> {
        let video = self.source.open(input)?;
        let total = video.total_frames;
        self.logger.info(&format!(
            "Scanning {} ({total} frames at {:.2} fps)",
            input.display(),
            video.fps
        ));

        let mut aggregator = MotionAggregator::new(&video, created_at)
            .with_source_video(input.display().to_string());
        let mut normalizer = MouthOpennessNormalizer::new();
        let (rx, reader) = spawn_source_reader(self.source, self.channel_capacity);

        loop {
            let received = match self.timeout {
                Some(limit) => match rx.recv_timeout(limit) {
                    Ok(item) => Some(item),
                    Err(RecvTimeoutError::Disconnected) => None,
                    Err(RecvTimeoutError::Timeout) => {
                        return Err(MotionError::external(
                            SOURCE_TOOL,
                            format!(
                                "no frame after frame {} within {:.1}s",
                                aggregator.frames_appended(),
                                limit.as_secs_f64()
                            ),
                        ));
                    }
                },
                None => rx.recv().ok(),
            };
            let Some(item) = received else { break };
            let detection = item?;

            let started = Instant::now();
            let facial = detection
                .faces
                .iter()
                .map(|face| normalizer.facial_frame(detection.frame, detection.timestamp, face))
                .collect();
            let assignment = self
                .assigner
                .assign(detection.frame, detection.skeletal, facial);
            if assignment.actor_count() == 0 {
                log::debug!("Frame {}: no bodies detected", detection.frame);
            }
            aggregator.append(assignment, detection.timestamp, detection.flow)?;
            self.logger
                .timing("assign", started.elapsed().as_secs_f64() * 1000.0);
            self.logger.progress(aggregator.frames_appended(), total);
        }

        if reader.join().is_err() {
            return Err(MotionError::external(SOURCE_TOOL, "reader thread panicked"));
        }

        let dataset = aggregator.finish(self.transcription.take());
        self.logger
            .metric("actors", dataset.actors.len() as f64);
        self.logger.metric(
            "max_actors_per_frame",
            dataset.metadata.max_actors_detected as f64,
        );
        self.logger.metric("mouth_max_distance", normalizer.max_distance());
        self.logger.summary();
        Ok(dataset)
    }
}
