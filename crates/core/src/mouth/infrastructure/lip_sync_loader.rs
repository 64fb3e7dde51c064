use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::mouth::domain::mouth_cue::MouthCue;
use crate::shared::error::MotionError;
use crate::shared::json_file::read_json;

/// Output of the lip-sync collaborator: timed mouth cues plus whatever
/// metadata it reports about the run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LipSyncDocument {
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(rename = "mouthCues", default)]
    pub cues: Vec<MouthCue>,
}

impl LipSyncDocument {
    pub fn validate(&self) -> Result<(), MotionError> {
        for (i, cue) in self.cues.iter().enumerate() {
            if !(cue.start.is_finite() && cue.start >= 0.0) {
                return Err(MotionError::malformed(
                    format!("mouthCues[{i}].start"),
                    "time >= 0",
                    cue.start.to_string(),
                ));
            }
            if !(cue.end.is_finite() && cue.end >= cue.start) {
                return Err(MotionError::malformed(
                    format!("mouthCues[{i}].end"),
                    format!("time >= {}", cue.start),
                    cue.end.to_string(),
                ));
            }
        }
        Ok(())
    }
}

pub fn load_lip_sync(path: &Path) -> Result<LipSyncDocument, MotionError> {
    let doc: LipSyncDocument = read_json(path)?;
    doc.validate().map_err(|e| e.in_document(path))?;
    log::info!("Loaded {} mouth cues from {}", doc.cues.len(), path.display());
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mouth::domain::mouth_cue::MouthShape;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, json: &str) -> std::path::PathBuf {
        let path = dir.path().join("lipsync.json");
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_loads_cues_and_metadata() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            r#"{"metadata": {"soundFile": "voice.wav", "duration": 1.2},
                "mouthCues": [{"start": 0.0, "end": 0.4, "value": "X"},
                              {"start": 0.4, "end": 1.2, "value": "B"}]}"#,
        );
        let doc = load_lip_sync(&path).unwrap();
        assert_eq!(doc.cues.len(), 2);
        assert_eq!(doc.cues[1].shape, MouthShape::B);
        assert_eq!(doc.metadata["soundFile"], "voice.wav");
    }

    #[test]
    fn test_unknown_shape_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, r#"{"mouthCues": [{"start": 0, "end": 1, "value": "K"}]}"#);
        match load_lip_sync(&path).unwrap_err() {
            MotionError::MalformedData {
                location, found, ..
            } => {
                assert!(location.contains("lipsync.json"), "{location}");
                assert!(found.contains("'K'"), "{found}");
            }
            other => panic!("expected MalformedData, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_type_start_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, r#"{"mouthCues": [{"start": "zero", "end": 1, "value": "A"}]}"#);
        match load_lip_sync(&path).unwrap_err() {
            MotionError::MalformedData {
                expected, found, ..
            } => {
                assert_eq!(expected, "f64");
                assert!(found.contains("\"zero\""), "{found}");
            }
            other => panic!("expected MalformedData, got {other:?}"),
        }
    }

    #[test]
    fn test_reversed_cue_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, r#"{"mouthCues": [{"start": 2.0, "end": 1.0, "value": "A"}]}"#);
        assert!(matches!(
            load_lip_sync(&path).unwrap_err(),
            MotionError::MalformedData { .. }
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_lip_sync(&dir.path().join("none.json")).unwrap_err(),
            MotionError::MissingSource { .. }
        ));
    }
}
