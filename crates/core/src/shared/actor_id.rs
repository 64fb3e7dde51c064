use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use super::error::MotionError;

/// Rank-based actor handle. Rendered as a string integer ("0", "1", ...)
/// at the persistence boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(u32);

impl ActorId {
    /// The leftmost subject, and the fallback owner of unmatched faces.
    pub const PRIMARY: ActorId = ActorId(0);

    pub fn new(rank: u32) -> Self {
        Self(rank)
    }

    pub fn from_rank(rank: usize) -> Self {
        Self(rank as u32)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ActorId {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>()
            .map(ActorId)
            .map_err(|_| MotionError::malformed("actor id", "string integer", format!("'{s}'")))
    }
}

impl Serialize for ActorId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
