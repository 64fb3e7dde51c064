use std::f64::consts::TAU;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::ingestion::domain::detections::{DetectionFrame, FaceDetection};
use crate::ingestion::domain::landmark_source::LandmarkSource;
use crate::shared::constants::{MAX_FLOW_VECTORS, POSE_LANDMARK_COUNT};
use crate::shared::error::MotionError;
use crate::shared::landmark::{LandmarkPoint, SkeletalFrame};
use crate::shared::motion_sample::OpticalFlow;
use crate::shared::video_metadata::VideoMetadata;

#[derive(Deserialize)]
struct HeaderDto {
    fps: f64,
    width: u32,
    height: u32,
    total_frames: usize,
}

#[derive(Deserialize)]
struct FrameDto {
    frame: usize,
    #[serde(default)]
    poses: Vec<Vec<LandmarkPoint>>,
    #[serde(default)]
    faces: Vec<FaceDto>,
    #[serde(default)]
    flow: Option<FlowDto>,
}

#[derive(Deserialize)]
struct FaceDto {
    #[serde(default)]
    upper_lip: Option<LandmarkPoint>,
    #[serde(default)]
    lower_lip: Option<LandmarkPoint>,
    #[serde(default)]
    mesh: Vec<LandmarkPoint>,
}

#[derive(Deserialize)]
struct FlowDto {
    magnitude: f64,
    angle: f64,
    #[serde(default)]
    vectors: Vec<[f64; 2]>,
}

/// Reads detector output stored as JSON lines: a header object with the
/// video properties, then one object per decoded frame.
pub struct JsonLinesSource {
    path: PathBuf,
    lines: Option<Lines<BufReader<File>>>,
    line_number: usize,
    metadata: Option<VideoMetadata>,
    max_flow_vectors: usize,
}

impl JsonLinesSource {
    pub fn new() -> Self {
        Self {
            path: PathBuf::new(),
            lines: None,
            line_number: 0,
            metadata: None,
            max_flow_vectors: MAX_FLOW_VECTORS,
        }
    }

    pub fn with_max_flow_vectors(mut self, max: usize) -> Self {
        self.max_flow_vectors = max;
        self
    }

    fn next_frame(&mut self) -> Option<Result<DetectionFrame, MotionError>> {
        let metadata = self.metadata.as_ref()?;
        let lines = self.lines.as_mut()?;
        for line in lines.by_ref() {
            self.line_number += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    return Some(Err(MotionError::Io {
                        path: self.path.clone(),
                        source: e,
                    }))
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(
                parse_frame(&line, self.line_number, metadata, self.max_flow_vectors)
                    .map_err(|e| e.in_document(&self.path)),
            );
        }
        None
    }
}

impl Default for JsonLinesSource {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_frame(
    line: &str,
    line_number: usize,
    metadata: &VideoMetadata,
    max_flow_vectors: usize,
) -> Result<DetectionFrame, MotionError> {
    let location = format!("line {line_number}");
    let dto: FrameDto = serde_json::from_str(line)
        .map_err(|e| MotionError::malformed(&location, "detection frame object", e.to_string()))?;
    let timestamp = metadata.timestamp_of(dto.frame);

    let mut skeletal = Vec::with_capacity(dto.poses.len());
    for (i, pose) in dto.poses.into_iter().enumerate() {
        if pose.is_empty() {
            log::debug!("Frame {}: skipping empty pose {i}", dto.frame);
            continue;
        }
        if pose.len() != POSE_LANDMARK_COUNT {
            return Err(MotionError::malformed(
                format!("{location} poses[{i}]"),
                format!("{POSE_LANDMARK_COUNT} landmarks"),
                pose.len().to_string(),
            ));
        }
        skeletal.push(SkeletalFrame::new(dto.frame, timestamp, pose)?);
    }

    let faces = dto
        .faces
        .into_iter()
        .map(|f| FaceDetection {
            upper_lip: f.upper_lip,
            lower_lip: f.lower_lip,
            mesh: f.mesh,
        })
        .collect();

    let flow = match dto.flow {
        Some(f) => {
            let mut angle = f.angle.rem_euclid(TAU);
            if angle >= TAU {
                angle = 0.0;
            }
            OpticalFlow::new(f.magnitude, angle, f.vectors).decimated(max_flow_vectors)
        }
        None => OpticalFlow::still(),
    };
    flow.validate(&format!("{location} flow"))?;

    Ok(DetectionFrame {
        frame: dto.frame,
        timestamp,
        skeletal,
        faces,
        flow,
    })
}

impl LandmarkSource for JsonLinesSource {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, MotionError> {
        let file = File::open(path).map_err(|e| MotionError::from_io(path, e))?;
        let mut lines = BufReader::new(file).lines();
        self.path = path.to_path_buf();
        self.line_number = 1;

        let header = lines
            .next()
            .ok_or_else(|| {
                MotionError::malformed("line 1", "header object", "end of file").in_document(path)
            })?
            .map_err(|e| MotionError::from_io(path, e))?;
        let header: HeaderDto = serde_json::from_str(&header).map_err(|e| {
            MotionError::malformed("line 1", "header object", e.to_string()).in_document(path)
        })?;

        let metadata = VideoMetadata {
            width: header.width,
            height: header.height,
            fps: header.fps,
            total_frames: header.total_frames,
        };
        metadata.validate().map_err(|e| e.in_document(path))?;

        log::info!(
            "Detections: {}x{} @ {:.2} fps, {} frames",
            metadata.width,
            metadata.height,
            metadata.fps,
            metadata.total_frames
        );
        self.lines = Some(lines);
        self.metadata = Some(metadata.clone());
        Ok(metadata)
    }

    fn frames(&mut self) -> Box<dyn Iterator<Item = Result<DetectionFrame, MotionError>> + '_> {
        if self.lines.is_none() {
            return Box::new(std::iter::once(Err(MotionError::external(
                "landmark source",
                "not opened",
            ))));
        }
        Box::new(std::iter::from_fn(move || self.next_frame()))
    }

    fn close(&mut self) {
        self.lines = None;
        self.metadata = None;
    }
}
