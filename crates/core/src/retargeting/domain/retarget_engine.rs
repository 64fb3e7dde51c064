use std::collections::HashMap;

use nalgebra::{Unit, UnitQuaternion};

use super::bone::{Bone, TargetSkeleton};
use super::bone_resolver::BoneResolver;
use super::bone_solver::{blend, shortest_arc};
use super::mapping_table::MappingTable;
use crate::shared::actor_id::ActorId;
use crate::shared::constants::{DEFAULT_SMOOTHING_WEIGHT, DEFAULT_VISIBILITY_THRESHOLD};
use crate::shared::error::MotionError;
use crate::shared::keyframe::{KeyframeOp, KeyframeTarget, KeyframeValue};
use crate::shared::landmark::{FrameIndex, SkeletalFrame};

const MIN_SEGMENT_LENGTH: f64 = 1e-12;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetargetConfig {
    /// Landmarks below this confidence leave the bone at its last pose.
    pub visibility_threshold: f64,
    /// Slerp weight toward the new rotation; 1.0 disables smoothing.
    pub smoothing_weight: f64,
}

impl Default for RetargetConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
            smoothing_weight: DEFAULT_SMOOTHING_WEIGHT,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoneKeyframe {
    pub actor: ActorId,
    pub bone: String,
    pub frame: FrameIndex,
    pub rotation: UnitQuaternion<f64>,
}

impl BoneKeyframe {
    pub fn to_op(&self) -> KeyframeOp {
        KeyframeOp {
            target: KeyframeTarget::Bone {
                actor: self.actor,
                bone: self.bone.clone(),
            },
            frame: self.frame,
            value: KeyframeValue::rotation(&self.rotation),
        }
    }
}

/// Per-actor smoothing memory: the last rotation emitted for each bone.
#[derive(Clone, Debug, Default)]
pub struct RetargetState {
    last_rotation: HashMap<String, UnitQuaternion<f64>>,
    last_frame: Option<FrameIndex>,
}

impl RetargetState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_rotation(&self, bone: &str) -> Option<&UnitQuaternion<f64>> {
        self.last_rotation.get(bone)
    }

    pub fn last_frame(&self) -> Option<FrameIndex> {
        self.last_frame
    }
}

#[derive(Debug)]
pub struct RetargetOutcome {
    pub actor: ActorId,
    pub keyframes: Vec<BoneKeyframe>,
    /// Non-fatal problems: unresolved bones and degenerate segments.
    pub diagnostics: Vec<MotionError>,
}

struct BoneBinding<'a> {
    bone: &'a Bone,
    start: usize,
    end: usize,
}

/// Drives skeleton bones from body-landmark segments.
///
/// Each mapped bone is rotated so its rest direction points along the
/// segment between its two landmarks, blended with the previous rotation.
pub struct RetargetEngine {
    mapping: MappingTable,
    resolver: BoneResolver,
    config: RetargetConfig,
}

impl RetargetEngine {
    pub fn new(mapping: MappingTable, resolver: BoneResolver, config: RetargetConfig) -> Self {
        Self {
            mapping,
            resolver,
            config,
        }
    }

    pub fn config(&self) -> &RetargetConfig {
        &self.config
    }

    pub fn retarget_actor(
        &self,
        actor: ActorId,
        frames: &[SkeletalFrame],
        skeleton: &TargetSkeleton,
    ) -> Result<RetargetOutcome, MotionError> {
        let mut state = RetargetState::new();
        self.retarget_with_state(actor, frames, skeleton, &mut state)
    }

    /// Continues from `state`, so a sequence may be fed in consecutive slices.
    pub fn retarget_with_state(
        &self,
        actor: ActorId,
        frames: &[SkeletalFrame],
        skeleton: &TargetSkeleton,
        state: &mut RetargetState,
    ) -> Result<RetargetOutcome, MotionError> {
        let mut outcome = RetargetOutcome {
            actor,
            keyframes: Vec::new(),
            diagnostics: Vec::new(),
        };
        if frames.is_empty() {
            return Ok(outcome);
        }

        let bindings = self.bind(skeleton, &mut outcome.diagnostics);
        for skeletal in frames {
            let frame = skeletal.frame();
            if let Some(last) = state.last_frame {
                if frame <= last {
                    return Err(MotionError::malformed(
                        format!("actors.{actor}.pose_frames"),
                        format!("frame > {last}"),
                        frame.to_string(),
                    ));
                }
            }
            state.last_frame = Some(frame);

            for binding in &bindings {
                if let Some(keyframe) =
                    self.solve_bone(actor, skeletal, binding, state, &mut outcome.diagnostics)
                {
                    outcome.keyframes.push(keyframe);
                }
            }
        }

        log::debug!(
            "Actor {actor}: {} bone keyframes over {} frames",
            outcome.keyframes.len(),
            frames.len()
        );
        Ok(outcome)
    }

    fn bind<'a>(
        &self,
        skeleton: &'a TargetSkeleton,
        diagnostics: &mut Vec<MotionError>,
    ) -> Vec<BoneBinding<'a>> {
        let mut bindings = Vec::with_capacity(self.mapping.entries().len());
        for entry in self.mapping.entries() {
            match self.resolver.resolve(&entry.bone, skeleton) {
                Some(bone) => bindings.push(BoneBinding {
                    bone,
                    start: entry.start,
                    end: entry.end,
                }),
                None => {
                    log::warn!(
                        "Bone '{}' not found in skeleton '{}'",
                        entry.bone,
                        skeleton.name()
                    );
                    diagnostics.push(MotionError::UnresolvedBone {
                        bone: entry.bone.clone(),
                    });
                }
            }
        }
        bindings
    }

    fn solve_bone(
        &self,
        actor: ActorId,
        skeletal: &SkeletalFrame,
        binding: &BoneBinding<'_>,
        state: &mut RetargetState,
        diagnostics: &mut Vec<MotionError>,
    ) -> Option<BoneKeyframe> {
        let start = skeletal.landmark(binding.start)?;
        let end = skeletal.landmark(binding.end)?;
        let threshold = self.config.visibility_threshold;
        if start.confidence() < threshold || end.confidence() < threshold {
            return None;
        }

        let name = binding.bone.name();
        let Some(direction) = Unit::try_new(end.position() - start.position(), MIN_SEGMENT_LENGTH)
        else {
            log::debug!("Actor {actor}: zero-length segment for '{name}' at frame {}", skeletal.frame());
            diagnostics.push(MotionError::DegenerateGeometry {
                bone: name.to_string(),
                frame: skeletal.frame(),
            });
            return None;
        };

        let target = shortest_arc(binding.bone.rest_direction(), &direction);
        let rotation = match state.last_rotation.get(name) {
            Some(prior) => blend(prior, &target, self.config.smoothing_weight),
            None => target,
        };
        state.last_rotation.insert(name.to_string(), rotation);

        Some(BoneKeyframe {
            actor,
            bone: name.to_string(),
            frame: skeletal.frame(),
            rotation,
        })
    }
}

impl Default for RetargetEngine {
    fn default() -> Self {
        Self::new(
            MappingTable::default(),
            BoneResolver::default(),
            RetargetConfig::default(),
        )
    }
}
