use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::aggregation::domain::mission_dataset::MissionDataset;
use crate::mouth::domain::mouth_cue::MouthCue;
use crate::shared::error::MotionError;

pub const STATUS_SILENT_DEFAULT: &str = "silent_default";
pub const STATUS_NOT_GENERATED: &str = "not_generated";

/// Whether the run carries a voice track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MissionMode {
    /// No audio: the mouth stays closed unless measured openness is used.
    Silent,
    /// Voice track present: lip-sync cues drive the mouth.
    Drama,
}

impl fmt::Display for MissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissionMode::Silent => write!(f, "SILENT"),
            MissionMode::Drama => write!(f, "DRAMA"),
        }
    }
}

impl FromStr for MissionMode {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SILENT" => Ok(MissionMode::Silent),
            "DRAMA" => Ok(MissionMode::Drama),
            _ => Err(MotionError::malformed("mode", "SILENT or DRAMA", format!("'{s}'"))),
        }
    }
}

/// Script produced by the transcription and text collaborators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeechBlock {
    #[serde(default)]
    pub original_text: String,
    #[serde(default)]
    pub viral_text: String,
    #[serde(default)]
    pub transformation_applied: bool,
    pub timestamp: DateTime<Utc>,
}

impl SpeechBlock {
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            original_text: String::new(),
            viral_text: String::new(),
            transformation_applied: false,
            timestamp,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MouthBlock {
    pub cues: Vec<MouthCue>,
    pub metadata: Map<String, Value>,
}

impl MouthBlock {
    pub fn silent() -> Self {
        let mut metadata = Map::new();
        metadata.insert("status".into(), STATUS_SILENT_DEFAULT.into());
        metadata.insert("mode".into(), MissionMode::Silent.to_string().into());
        metadata.insert("default_mouth_open_ratio".into(), 0.0.into());
        Self {
            cues: Vec::new(),
            metadata,
        }
    }

    pub fn not_generated(mode: MissionMode) -> Self {
        let mut metadata = Map::new();
        metadata.insert("status".into(), STATUS_NOT_GENERATED.into());
        metadata.insert("mode".into(), mode.to_string().into());
        Self {
            cues: Vec::new(),
            metadata,
        }
    }

    /// The `status` entry of the metadata, `silent_default` when absent.
    pub fn status(&self) -> &str {
        self.metadata
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or(STATUS_SILENT_DEFAULT)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MissionMetadata {
    pub mission_id: String,
    pub created_at: DateTime<Utc>,
    pub mode: MissionMode,
    pub source_dataset: Option<String>,
}

/// The dataset plus everything the forge needs besides motion: the script,
/// the mouth cues and the mode.
#[derive(Clone, Debug, PartialEq)]
pub struct MissionDocument {
    pub metadata: MissionMetadata,
    pub dataset: MissionDataset,
    pub speech: SpeechBlock,
    pub mouth: MouthBlock,
}

/// `MISSION_<yyyymmdd_HHMMSS>` in UTC.
pub fn mission_id_for(at: DateTime<Utc>) -> String {
    format!("MISSION_{}", at.format("%Y%m%d_%H%M%S"))
}

/// Merges a dataset with the optional speech and lip-sync outputs.
///
/// SILENT ignores any lip-sync input. DRAMA without cues is recorded as
/// `not_generated` so the forge falls back to measured openness.
pub fn compile_mission(
    dataset: MissionDataset,
    speech: Option<SpeechBlock>,
    lip_sync: Option<MouthBlock>,
    mode: MissionMode,
    now: DateTime<Utc>,
) -> MissionDocument {
    let mouth = match (mode, lip_sync) {
        (MissionMode::Silent, lip_sync) => {
            if lip_sync.is_some() {
                log::warn!("SILENT mode: ignoring supplied lip-sync cues");
            }
            MouthBlock::silent()
        }
        (MissionMode::Drama, Some(block)) => block,
        (MissionMode::Drama, None) => MouthBlock::not_generated(mode),
    };
    let speech = speech.unwrap_or_else(|| SpeechBlock::empty(now));

    log::info!(
        "Mission compiled: mode {mode}, {} actors, {} camera frames, {} mouth cues",
        dataset.actors.len(),
        dataset.frame_count(),
        mouth.cues.len()
    );

    MissionDocument {
        metadata: MissionMetadata {
            mission_id: mission_id_for(now),
            created_at: now,
            mode,
            source_dataset: Some(dataset.metadata.session_id.clone()),
        },
        dataset,
        speech,
        mouth,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::aggregation::domain::actor_table::ActorTable;
    use crate::aggregation::domain::mission_dataset::DatasetMetadata;
    use crate::shared::actor_id::ActorId;
    use crate::shared::landmark::fixtures::skeletal;
    use crate::shared::landmark::FacialFrame;
    use crate::shared::motion_sample::{CameraMotionSample, OpticalFlow};
    use crate::shared::video_metadata::VideoMetadata;
    use chrono::TimeZone;

    pub fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap()
    }

    /// Two actors over `frames` frames with gentle camera drift.
    pub fn dataset(frames: usize) -> MissionDataset {
        let video = VideoMetadata {
            width: 1280,
            height: 720,
            fps: 30.0,
            total_frames: frames,
        };
        let mut actors = ActorTable::new();
        for frame in 0..frames {
            let primary = actors.get_or_create(ActorId::PRIMARY);
            primary.pose_frames.push(skeletal(frame, 0.3));
            primary
                .mouth_frames
                .push(FacialFrame::new(frame, frame as f64 / 30.0, 0.25));
            actors
                .get_or_create(ActorId::new(1))
                .pose_frames
                .push(skeletal(frame, 0.7));
        }
        let mut metadata = DatasetMetadata::from_video(&video, at());
        metadata.max_actors_detected = 2;
        MissionDataset {
            metadata,
            camera_motion: (0..frames)
                .map(|frame| CameraMotionSample {
                    frame,
                    timestamp: frame as f64 / 30.0,
                    flow: OpticalFlow::new(0.2, 3.0, vec![[0.5, -0.25]]),
                })
                .collect(),
            actors,
            transcription: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::mouth::domain::mouth_cue::MouthShape;

    fn cues() -> MouthBlock {
        MouthBlock {
            cues: vec![MouthCue {
                start: 0.0,
                end: 0.5,
                shape: MouthShape::B,
            }],
            metadata: Map::new(),
        }
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("silent".parse::<MissionMode>().unwrap(), MissionMode::Silent);
        assert_eq!("DRAMA".parse::<MissionMode>().unwrap(), MissionMode::Drama);
        assert!("LOUD".parse::<MissionMode>().is_err());
    }

    #[test]
    fn test_silent_mode_ignores_cues() {
        let mission = compile_mission(dataset(2), None, Some(cues()), MissionMode::Silent, at());
        assert!(mission.mouth.cues.is_empty());
        assert_eq!(mission.mouth.status(), STATUS_SILENT_DEFAULT);
        assert_eq!(mission.mouth.metadata["default_mouth_open_ratio"], 0.0);
        assert_eq!(mission.speech, SpeechBlock::empty(at()));
    }

    #[test]
    fn test_drama_mode_keeps_cues() {
        let mission = compile_mission(dataset(2), None, Some(cues()), MissionMode::Drama, at());
        assert_eq!(mission.mouth.cues.len(), 1);
    }

    #[test]
    fn test_drama_without_cues_not_generated() {
        let mission = compile_mission(dataset(2), None, None, MissionMode::Drama, at());
        assert!(mission.mouth.cues.is_empty());
        assert_eq!(mission.mouth.status(), STATUS_NOT_GENERATED);
        assert_eq!(mission.mouth.metadata["mode"], "DRAMA");
    }

    #[test]
    fn test_metadata() {
        let mission = compile_mission(dataset(2), None, None, MissionMode::Drama, at());
        assert_eq!(mission.metadata.mission_id, "MISSION_20240601_083000");
        assert_eq!(mission.metadata.mode, MissionMode::Drama);
        assert_eq!(
            mission.metadata.source_dataset.as_deref(),
            Some("SESSION_20240601_083000")
        );
    }

    #[test]
    fn test_speech_passes_through() {
        let speech = SpeechBlock {
            original_text: "hello".into(),
            viral_text: "HELLO!!".into(),
            transformation_applied: true,
            timestamp: at(),
        };
        let mission = compile_mission(dataset(1), Some(speech.clone()), None, MissionMode::Drama, at());
        assert_eq!(mission.speech, speech);
    }
}
