use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::render::domain::keyframe_sink::KeyframeSink;
use crate::shared::error::MotionError;
use crate::shared::keyframe::KeyframeOp;

/// Writes one JSON object per keyframe operation, one per line.
pub struct JsonLinesKeyframeWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    written: usize,
}

impl JsonLinesKeyframeWriter {
    pub fn create(path: &Path) -> Result<Self, MotionError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| MotionError::from_io(parent, e))?;
        }
        let file = File::create(path).map_err(|e| MotionError::from_io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl KeyframeSink for JsonLinesKeyframeWriter {
    fn insert(&mut self, op: &KeyframeOp) -> Result<(), MotionError> {
        serde_json::to_writer(&mut self.writer, op).map_err(|source| MotionError::Json {
            path: self.path.clone(),
            source,
        })?;
        self.writer
            .write_all(b"\n")
            .map_err(|e| MotionError::from_io(&self.path, e))?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), MotionError> {
        self.writer
            .flush()
            .map_err(|e| MotionError::from_io(&self.path, e))?;
        log::info!(
            "Wrote {} keyframe operations to {}",
            self.written,
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::actor_id::ActorId;
    use crate::shared::keyframe::{KeyframeTarget, KeyframeValue};
    use tempfile::TempDir;

    #[test]
    fn test_one_line_per_operation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("keyframes.jsonl");
        let mut writer = JsonLinesKeyframeWriter::create(&path).unwrap();

        writer
            .insert(&KeyframeOp {
                target: KeyframeTarget::Camera,
                frame: 0,
                value: KeyframeValue::CameraTransform {
                    location: [0.0, -3.0, 1.5],
                    rotation_euler: [1.1, 0.0, 0.0],
                },
            })
            .unwrap();
        writer
            .insert(&KeyframeOp {
                target: KeyframeTarget::MouthControl {
                    actor: ActorId::PRIMARY,
                },
                frame: 4,
                value: KeyframeValue::Scalar(0.7),
            })
            .unwrap();
        writer.finish().unwrap();
        assert_eq!(writer.written(), 2);

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["target"]["kind"], "camera");
        assert_eq!(lines[0]["value"]["camera_transform"]["location"][1], -3.0);
        assert_eq!(lines[1]["frame"], 4);
        assert_eq!(lines[1]["value"]["scalar"], 0.7);
    }
}
