use super::mission_dataset::MissionDataset;
use crate::shared::constants::{MAX_FLOW_VECTORS, POSE_LANDMARK_COUNT};
use crate::shared::error::MotionError;

/// Outcome of checking a dataset against its invariants.
///
/// Collects every violation instead of stopping at the first one.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<MotionError>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// First error, if any.
    pub fn into_result(self) -> Result<(), MotionError> {
        match self.errors.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn error(&mut self, location: String, expected: impl Into<String>, found: impl Into<String>) {
        self.errors
            .push(MotionError::malformed(location, expected, found));
    }
}

pub fn validate_dataset(dataset: &MissionDataset) -> ValidationReport {
    let mut report = ValidationReport::default();
    let meta = &dataset.metadata;

    if !(meta.fps.is_finite() && meta.fps > 0.0) {
        report.error("metadata.fps".into(), "fps > 0", meta.fps.to_string());
    }
    if dataset.camera_motion.is_empty() {
        report.warnings.push("camera_motion is empty".to_string());
    }
    if meta.total_frames != dataset.camera_motion.len() {
        report.warnings.push(format!(
            "metadata.total_frames is {} but camera_motion has {} samples",
            meta.total_frames,
            dataset.camera_motion.len()
        ));
    }

    for (i, sample) in dataset.camera_motion.iter().enumerate() {
        let location = format!("camera_motion[{i}]");
        if sample.frame != i {
            report.error(
                format!("{location}.frame_number"),
                i.to_string(),
                sample.frame.to_string(),
            );
        }
        if let Err(e) = sample.flow.validate(&format!("{location}.optical_flow")) {
            report.errors.push(e);
        }
        if sample.flow.vectors.len() > MAX_FLOW_VECTORS {
            report.error(
                format!("{location}.optical_flow.flow_vectors"),
                format!("at most {MAX_FLOW_VECTORS} vectors"),
                sample.flow.vectors.len().to_string(),
            );
        }
    }

    for (id, actor) in dataset.actors.iter() {
        if actor.is_empty() {
            report.warnings.push(format!("actor {id} has no frames"));
        }

        let mut previous = None;
        for (i, pose) in actor.pose_frames.iter().enumerate() {
            let location = format!("actors.{id}.pose_frames[{i}]");
            if pose.landmarks().len() != POSE_LANDMARK_COUNT {
                report.error(
                    format!("{location}.landmarks"),
                    format!("{POSE_LANDMARK_COUNT} landmarks"),
                    pose.landmarks().len().to_string(),
                );
            }
            if !dataset.covers(pose.frame()) {
                report.error(
                    format!("{location}.frame_number"),
                    format!("frame < {}", dataset.frame_count()),
                    pose.frame().to_string(),
                );
            }
            if let Some(prev) = previous {
                if pose.frame() <= prev {
                    report.error(
                        format!("{location}.frame_number"),
                        format!("frame > {prev}"),
                        pose.frame().to_string(),
                    );
                }
            }
            previous = Some(pose.frame());
        }

        let mut previous = None;
        for (i, mouth) in actor.mouth_frames.iter().enumerate() {
            let location = format!("actors.{id}.mouth_frames[{i}]");
            if !(0.0..=1.0).contains(&mouth.mouth_open_ratio()) {
                report.error(
                    format!("{location}.mouth_open_ratio"),
                    "ratio in [0, 1]",
                    mouth.mouth_open_ratio().to_string(),
                );
            }
            if !dataset.covers(mouth.frame()) {
                report.error(
                    format!("{location}.frame_number"),
                    format!("frame < {}", dataset.frame_count()),
                    mouth.frame().to_string(),
                );
            }
            if let Some(prev) = previous {
                if mouth.frame() <= prev {
                    report.error(
                        format!("{location}.frame_number"),
                        format!("frame > {prev}"),
                        mouth.frame().to_string(),
                    );
                }
            }
            previous = Some(mouth.frame());
        }
    }

    if let Some(t) = &dataset.transcription {
        if !(0.0..=1.0).contains(&t.confidence) {
            report.error(
                "audio_transcription_global.confidence".into(),
                "confidence in [0, 1]",
                t.confidence.to_string(),
            );
        }
    }

    report
}
