use crate::shared::actor_id::ActorId;
use crate::shared::landmark::{FacialFrame, FrameIndex, SkeletalFrame};

/// Detections of one frame, each labelled with the actor it was given to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameAssignment {
    pub frame: FrameIndex,
    pub skeletal: Vec<(ActorId, SkeletalFrame)>,
    pub facial: Vec<(ActorId, FacialFrame)>,
}

impl FrameAssignment {
    /// Number of distinct actors that received a body this frame.
    pub fn actor_count(&self) -> usize {
        self.skeletal.len()
    }
}

/// Strategy for labelling a frame's unordered detections with actor IDs.
///
/// Implementations never fail: detections that cannot be placed are dropped.
pub trait IdentityAssigner: Send {
    fn assign(
        &mut self,
        frame: FrameIndex,
        skeletal: Vec<SkeletalFrame>,
        facial: Vec<FacialFrame>,
    ) -> FrameAssignment;
}
