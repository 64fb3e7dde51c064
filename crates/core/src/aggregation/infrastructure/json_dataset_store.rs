use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregation::domain::actor_table::{Actor, ActorTable};
use crate::aggregation::domain::dataset_validator::validate_dataset;
use crate::aggregation::domain::mission_dataset::{DatasetMetadata, MissionDataset, Transcription};
use crate::shared::actor_id::ActorId;
use crate::shared::constants::{MAX_ACTOR_ID, POSE_LANDMARK_COUNT};
use crate::shared::error::MotionError;
use crate::shared::json_file::{read_json, write_json};
use crate::shared::landmark::{FacialFrame, LandmarkPoint, SkeletalFrame};
use crate::shared::motion_sample::{CameraMotionSample, OpticalFlow};

#[derive(Serialize, Deserialize)]
pub(crate) struct DatasetDto {
    pub metadata: MetadataDto,
    pub camera_motion: Vec<CameraSampleDto>,
    #[serde(default)]
    pub actors: BTreeMap<String, ActorDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_transcription_global: Option<TranscriptionDto>,
}

#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct MetadataDto {
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_video: Option<String>,
    pub fps: f64,
    pub resolution: ResolutionDto,
    pub total_frames: usize,
    pub duration_seconds: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub max_actors_detected: usize,
}

#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct ResolutionDto {
    pub width: u32,
    pub height: u32,
}

#[derive(Serialize, Deserialize)]
pub(crate) struct CameraSampleDto {
    frame_number: usize,
    timestamp: f64,
    optical_flow: FlowDto,
}

#[derive(Serialize, Deserialize)]
struct FlowDto {
    magnitude: f64,
    angle: f64,
    #[serde(default)]
    flow_vectors: Vec<[f64; 2]>,
}

#[derive(Serialize, Deserialize)]
pub(crate) struct ActorDto {
    #[serde(default)]
    pose_frames: Vec<PoseFrameDto>,
    #[serde(default)]
    mouth_frames: Vec<MouthFrameDto>,
}

#[derive(Serialize, Deserialize)]
struct PoseFrameDto {
    frame_number: usize,
    timestamp: f64,
    landmarks: Vec<LandmarkDto>,
    center_x: f64,
}

#[derive(Serialize, Deserialize)]
struct LandmarkDto {
    x: f64,
    y: f64,
    z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    visibility: Option<f64>,
    landmark_id: usize,
}

#[derive(Serialize, Deserialize)]
struct MouthFrameDto {
    frame_number: usize,
    timestamp: f64,
    mouth_open_ratio: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    upper_lip_center: Option<LandmarkPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lower_lip_center: Option<LandmarkPoint>,
}

#[derive(Serialize, Deserialize)]
pub(crate) struct TranscriptionDto {
    text: String,
    confidence: f64,
    timestamp: DateTime<Utc>,
}

impl From<&DatasetMetadata> for MetadataDto {
    fn from(meta: &DatasetMetadata) -> Self {
        Self {
            session_id: meta.session_id.clone(),
            source_video: meta.source_video.clone(),
            fps: meta.fps,
            resolution: ResolutionDto {
                width: meta.width,
                height: meta.height,
            },
            total_frames: meta.total_frames,
            duration_seconds: meta.duration_seconds,
            created_at: meta.created_at,
            max_actors_detected: meta.max_actors_detected,
        }
    }
}

impl From<MetadataDto> for DatasetMetadata {
    fn from(dto: MetadataDto) -> Self {
        Self {
            session_id: dto.session_id,
            source_video: dto.source_video,
            fps: dto.fps,
            width: dto.resolution.width,
            height: dto.resolution.height,
            total_frames: dto.total_frames,
            duration_seconds: dto.duration_seconds,
            created_at: dto.created_at,
            max_actors_detected: dto.max_actors_detected,
        }
    }
}

impl DatasetDto {
    pub fn from_domain(dataset: &MissionDataset) -> Self {
        let camera_motion = dataset
            .camera_motion
            .iter()
            .map(|s| CameraSampleDto {
                frame_number: s.frame,
                timestamp: s.timestamp,
                optical_flow: FlowDto {
                    magnitude: s.flow.magnitude,
                    angle: s.flow.angle,
                    flow_vectors: s.flow.vectors.clone(),
                },
            })
            .collect();

        let actors = dataset
            .actors
            .iter()
            .map(|(id, actor)| (id.to_string(), actor_to_dto(actor)))
            .collect();

        Self {
            metadata: MetadataDto::from(&dataset.metadata),
            camera_motion,
            actors,
            audio_transcription_global: dataset.transcription.as_ref().map(|t| TranscriptionDto {
                text: t.text.clone(),
                confidence: t.confidence,
                timestamp: t.timestamp,
            }),
        }
    }

    pub fn into_domain(self) -> Result<MissionDataset, MotionError> {
        let camera_motion = self
            .camera_motion
            .into_iter()
            .map(|s| CameraMotionSample {
                frame: s.frame_number,
                timestamp: s.timestamp,
                flow: OpticalFlow::new(
                    s.optical_flow.magnitude,
                    s.optical_flow.angle,
                    s.optical_flow.flow_vectors,
                ),
            })
            .collect();

        let mut actors = ActorTable::new();
        for (key, dto) in self.actors {
            let id: ActorId = key.parse().map_err(|_| {
                MotionError::malformed("actors", "string integer actor id", format!("'{key}'"))
            })?;
            if id >= ActorId::new(MAX_ACTOR_ID) {
                return Err(MotionError::malformed(
                    "actors",
                    format!("actor id below {MAX_ACTOR_ID}"),
                    format!("'{key}'"),
                ));
            }
            actors.insert(id, actor_from_dto(id, dto)?);
        }

        Ok(MissionDataset {
            metadata: self.metadata.into(),
            camera_motion,
            actors,
            transcription: self.audio_transcription_global.map(|t| Transcription {
                text: t.text,
                confidence: t.confidence,
                timestamp: t.timestamp,
            }),
        })
    }
}

fn actor_to_dto(actor: &Actor) -> ActorDto {
    ActorDto {
        pose_frames: actor
            .pose_frames
            .iter()
            .map(|pose| PoseFrameDto {
                frame_number: pose.frame(),
                timestamp: pose.timestamp(),
                landmarks: pose
                    .landmarks()
                    .iter()
                    .enumerate()
                    .map(|(landmark_id, p)| LandmarkDto {
                        x: p.x,
                        y: p.y,
                        z: p.z,
                        visibility: p.visibility,
                        landmark_id,
                    })
                    .collect(),
                center_x: pose.anchor_x(),
            })
            .collect(),
        mouth_frames: actor
            .mouth_frames
            .iter()
            .map(|mouth| MouthFrameDto {
                frame_number: mouth.frame(),
                timestamp: mouth.timestamp(),
                mouth_open_ratio: mouth.mouth_open_ratio(),
                upper_lip_center: mouth.upper_lip().copied(),
                lower_lip_center: mouth.lower_lip().copied(),
            })
            .collect(),
    }
}

fn actor_from_dto(id: ActorId, dto: ActorDto) -> Result<Actor, MotionError> {
    let mut pose_frames = Vec::with_capacity(dto.pose_frames.len());
    for (i, pose) in dto.pose_frames.into_iter().enumerate() {
        let location = format!("actors.{id}.pose_frames[{i}].landmarks");
        if pose.landmarks.len() != POSE_LANDMARK_COUNT {
            return Err(MotionError::malformed(
                location,
                format!("{POSE_LANDMARK_COUNT} landmarks"),
                pose.landmarks.len().to_string(),
            ));
        }
        let mut landmarks = Vec::with_capacity(POSE_LANDMARK_COUNT);
        for (expected_id, l) in pose.landmarks.into_iter().enumerate() {
            if l.landmark_id != expected_id {
                return Err(MotionError::malformed(
                    format!("{location}[{expected_id}].landmark_id"),
                    expected_id.to_string(),
                    l.landmark_id.to_string(),
                ));
            }
            landmarks.push(LandmarkPoint {
                x: l.x,
                y: l.y,
                z: l.z,
                visibility: l.visibility,
            });
        }
        pose_frames.push(SkeletalFrame::new(pose.frame_number, pose.timestamp, landmarks)?);
    }

    let mut mouth_frames = Vec::with_capacity(dto.mouth_frames.len());
    for (i, mouth) in dto.mouth_frames.into_iter().enumerate() {
        if !(0.0..=1.0).contains(&mouth.mouth_open_ratio) {
            return Err(MotionError::malformed(
                format!("actors.{id}.mouth_frames[{i}].mouth_open_ratio"),
                "ratio in [0, 1]",
                mouth.mouth_open_ratio.to_string(),
            ));
        }
        mouth_frames.push(
            FacialFrame::new(mouth.frame_number, mouth.timestamp, mouth.mouth_open_ratio)
                .with_lips(mouth.upper_lip_center, mouth.lower_lip_center),
        );
    }

    Ok(Actor {
        pose_frames,
        mouth_frames,
    })
}

/// Parses a dataset document without checking cross-record invariants, so a
/// caller can produce a full validation report.
pub fn load_dataset_unchecked(path: &Path) -> Result<MissionDataset, MotionError> {
    let dto: DatasetDto = read_json(path)?;
    dto.into_domain().map_err(|e| e.in_document(path))
}

/// Loads and validates a dataset document.
///
/// Warnings are logged; the first invariant violation is returned as an error
/// with the document path prefixed to its location.
pub fn load_dataset(path: &Path) -> Result<MissionDataset, MotionError> {
    let dataset = load_dataset_unchecked(path)?;
    check_loaded(&dataset, path)?;

    log::info!(
        "Loaded dataset {} ({} frames, {} actors)",
        dataset.metadata.session_id,
        dataset.frame_count(),
        dataset.actors.len()
    );
    Ok(dataset)
}

pub(crate) fn check_loaded(dataset: &MissionDataset, path: &Path) -> Result<(), MotionError> {
    let report = validate_dataset(dataset);
    for warning in &report.warnings {
        log::warn!("{}: {warning}", path.display());
    }
    report.into_result().map_err(|e| e.in_document(path))
}

pub fn save_dataset(dataset: &MissionDataset, path: &Path) -> Result<(), MotionError> {
    write_json(path, &DatasetDto::from_domain(dataset))?;
    log::info!("Dataset written to {}", path.display());
    Ok(())
}
