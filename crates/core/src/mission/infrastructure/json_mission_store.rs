use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregation::infrastructure::json_dataset_store::{
    check_loaded, ActorDto, CameraSampleDto, DatasetDto, MetadataDto, TranscriptionDto,
};
use crate::mission::domain::mission_document::{
    MissionDocument, MissionMetadata, MissionMode, MouthBlock, SpeechBlock,
};
use crate::mouth::infrastructure::lip_sync_loader::LipSyncDocument;
use crate::shared::actor_id::ActorId;
use crate::shared::error::MotionError;
use crate::shared::json_file::{read_json, write_json};

const LANGUAGE: &str = "en-US";

#[derive(Serialize, Deserialize)]
struct MissionDto {
    metadata: MissionMetadataDto,
    camera_motion: Vec<CameraSampleDto>,
    #[serde(default)]
    actors: BTreeMap<String, ActorDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    audio_transcription_global: Option<TranscriptionDto>,
    speech: SpeechBlock,
    mouth: LipSyncDocument,
    mode: MissionMode,
    global_audio_sync: AudioSyncDto,
}

#[derive(Serialize, Deserialize)]
struct MissionMetadataDto {
    mission_id: String,
    #[serde(default = "default_language")]
    language: String,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_dataset: Option<String>,
    mode: MissionMode,
    source_metadata: MetadataDto,
}

#[derive(Serialize, Deserialize)]
struct AudioSyncDto {
    primary_actor_id: String,
    lip_sync_status: String,
}

fn default_language() -> String {
    LANGUAGE.to_string()
}

impl From<LipSyncDocument> for MouthBlock {
    fn from(doc: LipSyncDocument) -> Self {
        Self {
            cues: doc.cues,
            metadata: doc.metadata,
        }
    }
}

impl MissionDto {
    fn from_domain(mission: &MissionDocument) -> Self {
        let DatasetDto {
            metadata,
            camera_motion,
            actors,
            audio_transcription_global,
        } = DatasetDto::from_domain(&mission.dataset);

        Self {
            metadata: MissionMetadataDto {
                mission_id: mission.metadata.mission_id.clone(),
                language: default_language(),
                timestamp: mission.metadata.created_at,
                source_dataset: mission.metadata.source_dataset.clone(),
                mode: mission.metadata.mode,
                source_metadata: metadata,
            },
            camera_motion,
            actors,
            audio_transcription_global,
            speech: mission.speech.clone(),
            mouth: LipSyncDocument {
                metadata: mission.mouth.metadata.clone(),
                cues: mission.mouth.cues.clone(),
            },
            mode: mission.metadata.mode,
            global_audio_sync: AudioSyncDto {
                primary_actor_id: ActorId::PRIMARY.to_string(),
                lip_sync_status: mission.mouth.status().to_string(),
            },
        }
    }

    fn into_domain(self) -> Result<MissionDocument, MotionError> {
        if self.mode != self.metadata.mode {
            return Err(MotionError::malformed(
                "metadata.mode",
                self.mode.to_string(),
                self.metadata.mode.to_string(),
            ));
        }
        self.mouth.validate().map_err(|e| match e {
            MotionError::MalformedData {
                location,
                expected,
                found,
            } => MotionError::MalformedData {
                location: format!("mouth.{location}"),
                expected,
                found,
            },
            other => other,
        })?;

        let dataset = DatasetDto {
            metadata: self.metadata.source_metadata,
            camera_motion: self.camera_motion,
            actors: self.actors,
            audio_transcription_global: self.audio_transcription_global,
        }
        .into_domain()?;

        Ok(MissionDocument {
            metadata: MissionMetadata {
                mission_id: self.metadata.mission_id,
                created_at: self.metadata.timestamp,
                mode: self.mode,
                source_dataset: self.metadata.source_dataset,
            },
            dataset,
            speech: self.speech,
            mouth: self.mouth.into(),
        })
    }
}

pub fn save_mission(mission: &MissionDocument, path: &Path) -> Result<(), MotionError> {
    write_json(path, &MissionDto::from_domain(mission))?;
    log::info!(
        "Mission {} written to {}",
        mission.metadata.mission_id,
        path.display()
    );
    Ok(())
}

/// Loads a mission document and validates its dataset sub-trees.
pub fn load_mission(path: &Path) -> Result<MissionDocument, MotionError> {
    let dto: MissionDto = read_json(path)?;
    let mission = dto.into_domain().map_err(|e| e.in_document(path))?;
    check_loaded(&mission.dataset, path)?;
    log::info!(
        "Loaded mission {} (mode {}, {} mouth cues)",
        mission.metadata.mission_id,
        mission.metadata.mode,
        mission.mouth.cues.len()
    );
    Ok(mission)
}

/// Reads a speech block produced by the transcription collaborator.
pub fn load_speech(path: &Path) -> Result<SpeechBlock, MotionError> {
    read_json(path)
}
