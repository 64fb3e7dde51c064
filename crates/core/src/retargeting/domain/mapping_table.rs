use std::collections::BTreeMap;

use crate::shared::constants::POSE_LANDMARK_COUNT;
use crate::shared::error::MotionError;

/// A bone driven by the segment from one body landmark to another.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoneMapping {
    pub bone: String,
    pub start: usize,
    pub end: usize,
}

impl BoneMapping {
    pub fn new(bone: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            bone: bone.into(),
            start,
            end,
        }
    }
}

/// Bone name → landmark segment, in application order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappingTable {
    entries: Vec<BoneMapping>,
}

impl Default for MappingTable {
    /// Limbs and spine over the 33-point body layout: shoulders 11/12,
    /// elbows 13/14, wrists 15/16, hips 23/24, knees 25/26, ankles 27/28.
    fn default() -> Self {
        Self {
            entries: vec![
                BoneMapping::new("LeftUpperArm", 11, 13),
                BoneMapping::new("LeftLowerArm", 13, 15),
                BoneMapping::new("RightUpperArm", 12, 14),
                BoneMapping::new("RightLowerArm", 14, 16),
                BoneMapping::new("LeftUpperLeg", 23, 25),
                BoneMapping::new("LeftLowerLeg", 25, 27),
                BoneMapping::new("RightUpperLeg", 24, 26),
                BoneMapping::new("RightLowerLeg", 26, 28),
                BoneMapping::new("Spine", 23, 11),
            ],
        }
    }
}

impl MappingTable {
    pub fn new(entries: Vec<BoneMapping>) -> Result<Self, MotionError> {
        for entry in &entries {
            check_landmark(&entry.bone, entry.start)?;
            check_landmark(&entry.bone, entry.end)?;
        }
        Ok(Self { entries })
    }

    /// Replaces matching entries and appends new bones after the defaults.
    pub fn with_overrides(
        mut self,
        overrides: &BTreeMap<String, [usize; 2]>,
    ) -> Result<Self, MotionError> {
        for (bone, [start, end]) in overrides {
            check_landmark(bone, *start)?;
            check_landmark(bone, *end)?;
            match self.entries.iter_mut().find(|e| &e.bone == bone) {
                Some(entry) => {
                    entry.start = *start;
                    entry.end = *end;
                }
                None => self.entries.push(BoneMapping::new(bone.clone(), *start, *end)),
            }
        }
        Ok(self)
    }

    pub fn entries(&self) -> &[BoneMapping] {
        &self.entries
    }
}

fn check_landmark(bone: &str, id: usize) -> Result<(), MotionError> {
    if id >= POSE_LANDMARK_COUNT {
        return Err(MotionError::malformed(
            format!("bone_mapping.{bone}"),
            format!("landmark id < {POSE_LANDMARK_COUNT}"),
            id.to_string(),
        ));
    }
    Ok(())
}
