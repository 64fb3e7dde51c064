use std::collections::BTreeMap;

use crate::shared::actor_id::ActorId;
use crate::shared::landmark::{FacialFrame, SkeletalFrame};

/// Everything recorded for one rank-based identity.
///
/// Both sequences are ordered by frame but may have gaps.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Actor {
    pub pose_frames: Vec<SkeletalFrame>,
    pub mouth_frames: Vec<FacialFrame>,
}

impl Actor {
    pub fn is_empty(&self) -> bool {
        self.pose_frames.is_empty() && self.mouth_frames.is_empty()
    }
}

/// Actors keyed by handle, iterated in ascending ID order.
///
/// Ranks that never appeared have no entry, so a sparse key costs nothing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActorTable {
    actors: BTreeMap<ActorId, Actor>,
}

impl ActorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// Returns the actor, creating it on first appearance.
    pub fn get_or_create(&mut self, id: ActorId) -> &mut Actor {
        self.actors.entry(id).or_default()
    }

    pub fn insert(&mut self, id: ActorId, actor: Actor) {
        self.actors.insert(id, actor);
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.actors.contains_key(&id)
    }

    /// Actors in ascending ID order.
    pub fn iter(&self) -> impl Iterator<Item = (ActorId, &Actor)> {
        self.actors.iter().map(|(id, actor)| (*id, actor))
    }

    pub fn ids(&self) -> Vec<ActorId> {
        self.actors.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}
