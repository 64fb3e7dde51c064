use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::skeleton_loader::load_skeleton;
use crate::retargeting::domain::bone::TargetSkeleton;
use crate::shared::actor_id::ActorId;
use crate::shared::error::MotionError;

const DEFAULT_SKELETON_FILE: &str = "default.json";

/// Directory of skeleton descriptions: `actor_<id>.json` for a specific
/// actor, `default.json` for everyone else.
pub struct SkeletonLibrary {
    dir: PathBuf,
}

impl SkeletonLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that describes `actor`'s skeleton.
    pub fn skeleton_path(&self, actor: ActorId) -> Result<PathBuf, MotionError> {
        let specific = self.dir.join(format!("actor_{actor}.json"));
        if specific.is_file() {
            return Ok(specific);
        }
        let default = self.dir.join(DEFAULT_SKELETON_FILE);
        if default.is_file() {
            log::debug!("No skeleton for actor {actor}, using {}", default.display());
            return Ok(default);
        }
        Err(MotionError::MissingSource { path: specific })
    }

    pub fn load_for(&self, actor: ActorId) -> Result<TargetSkeleton, MotionError> {
        load_skeleton(&self.skeleton_path(actor)?)
    }

    /// Loads one skeleton per actor. Each file is parsed once even when
    /// several actors share it.
    pub fn load_all(
        &self,
        actors: &[ActorId],
    ) -> Result<BTreeMap<ActorId, TargetSkeleton>, MotionError> {
        let mut by_path: BTreeMap<PathBuf, TargetSkeleton> = BTreeMap::new();
        let mut skeletons = BTreeMap::new();
        for &actor in actors {
            let path = self.skeleton_path(actor)?;
            let skeleton = match by_path.get(&path) {
                Some(s) => s.clone(),
                None => {
                    let s = load_skeleton(&path)?;
                    by_path.insert(path, s.clone());
                    s
                }
            };
            skeletons.insert(actor, skeleton);
        }
        Ok(skeletons)
    }
}
