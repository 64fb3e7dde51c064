use std::collections::BTreeMap;

use super::mouth_cue::{MouthCue, MouthRatioTable};
use crate::shared::actor_id::ActorId;
use crate::shared::keyframe::{KeyframeOp, KeyframeTarget, KeyframeValue};
use crate::shared::landmark::{FacialFrame, FrameIndex};

/// Which input produced the mouth keyframes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouthSource {
    /// Timed shape cues from the lip-sync collaborator.
    Symbolic,
    /// Per-frame openness measured on actor "0".
    Continuous,
    /// Neither input had data; nothing was emitted.
    None,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouthKeyframe {
    pub frame: FrameIndex,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MouthDriveOutcome {
    pub source: MouthSource,
    pub actor: ActorId,
    /// In emission order. Overlapping cues produce several entries for one
    /// frame; the last one is the effective value.
    pub keyframes: Vec<MouthKeyframe>,
}

impl MouthDriveOutcome {
    /// Effective value per frame, later writes winning.
    pub fn resolved(&self) -> BTreeMap<FrameIndex, f64> {
        self.keyframes.iter().map(|k| (k.frame, k.value)).collect()
    }

    pub fn to_ops(&self) -> Vec<KeyframeOp> {
        self.keyframes
            .iter()
            .map(|k| KeyframeOp {
                target: KeyframeTarget::MouthControl { actor: self.actor },
                frame: k.frame,
                value: KeyframeValue::Scalar(k.value),
            })
            .collect()
    }
}

/// Maps lip-sync data onto the scalar mouth control of actor "0".
pub struct MouthDriveEngine {
    table: MouthRatioTable,
    fps: f64,
    frame_count: Option<usize>,
}

impl MouthDriveEngine {
    pub fn new(table: MouthRatioTable, fps: f64) -> Self {
        Self {
            table,
            fps,
            frame_count: None,
        }
    }

    /// Cue frames at or past `frame_count` are dropped.
    pub fn with_frame_count(mut self, frame_count: usize) -> Self {
        self.frame_count = Some(frame_count);
        self
    }

    /// Symbolic cues take precedence; the measured openness of actor "0" is
    /// used only when there are none.
    pub fn drive(&self, cues: &[MouthCue], primary_mouth: &[FacialFrame]) -> MouthDriveOutcome {
        let (source, keyframes) = if !cues.is_empty() {
            (MouthSource::Symbolic, self.from_cues(cues))
        } else if !primary_mouth.is_empty() {
            (MouthSource::Continuous, from_openness(primary_mouth))
        } else {
            log::warn!("No lip-sync cues and no mouth measurements; mouth left untouched");
            (MouthSource::None, Vec::new())
        };
        log::debug!("Mouth drive: {} keyframes from {source:?}", keyframes.len());
        MouthDriveOutcome {
            source,
            actor: ActorId::PRIMARY,
            keyframes,
        }
    }

    fn from_cues(&self, cues: &[MouthCue]) -> Vec<MouthKeyframe> {
        let mut keyframes = Vec::new();
        for (i, cue) in cues.iter().enumerate() {
            let first = (cue.start * self.fps).trunc() as FrameIndex;
            let mut last = (cue.end * self.fps).trunc() as FrameIndex;
            if let Some(count) = self.frame_count {
                let Some(final_frame) = count.checked_sub(1) else { break };
                if first > final_frame {
                    log::debug!("Mouth cue {i} starts past frame {final_frame}; skipped");
                    continue;
                }
                last = last.min(final_frame);
            }
            let value = self.table.ratio(cue.shape);
            keyframes.extend((first..=last).map(|frame| MouthKeyframe { frame, value }));
        }
        keyframes
    }
}

fn from_openness(frames: &[FacialFrame]) -> Vec<MouthKeyframe> {
    frames
        .iter()
        .map(|f| MouthKeyframe {
            frame: f.frame(),
            value: f.mouth_open_ratio(),
        })
        .collect()
}
