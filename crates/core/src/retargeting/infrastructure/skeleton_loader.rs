use std::path::Path;

use nalgebra::Vector3;
use serde::Deserialize;

use crate::retargeting::domain::bone::{Bone, TargetSkeleton};
use crate::shared::error::MotionError;
use crate::shared::json_file::read_json;

#[derive(Deserialize)]
struct SkeletonDto {
    #[serde(default)]
    name: Option<String>,
    bones: Vec<BoneDto>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoneDto {
    HeadTail {
        name: String,
        head: [f64; 3],
        tail: [f64; 3],
    },
    Direction {
        name: String,
        direction: [f64; 3],
    },
}

impl From<BoneDto> for Bone {
    fn from(dto: BoneDto) -> Self {
        match dto {
            BoneDto::HeadTail { name, head, tail } => {
                Bone::from_head_tail(name, Vector3::from(head), Vector3::from(tail))
            }
            BoneDto::Direction { name, direction } => {
                Bone::from_direction(name, Vector3::from(direction))
            }
        }
    }
}

/// Reads a skeleton description exported from the rendering side.
///
/// Bones are given either as head/tail positions or as a rest direction.
/// The skeleton is named after the file stem unless the document names it.
pub fn load_skeleton(path: &Path) -> Result<TargetSkeleton, MotionError> {
    let dto: SkeletonDto = read_json(path)?;
    if dto.bones.is_empty() {
        return Err(MotionError::malformed("bones", "at least one bone", "empty list").in_document(path));
    }
    let name = dto.name.unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    let bones: Vec<Bone> = dto.bones.into_iter().map(Bone::from).collect();
    log::debug!("Skeleton '{name}' loaded with {} bones", bones.len());
    Ok(TargetSkeleton::new(name, bones))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_loads_both_bone_forms() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hero.json");
        fs::write(
            &path,
            r#"{"bones": [
                {"name": "Spine", "head": [0, 0, 1], "tail": [0, 0, 2]},
                {"name": "LeftUpperArm", "direction": [2, 0, 0]}
            ]}"#,
        )
        .unwrap();

        let skeleton = load_skeleton(&path).unwrap();
        assert_eq!(skeleton.name(), "hero");
        assert_eq!(skeleton.bones().len(), 2);
        assert_relative_eq!(skeleton.bones()[0].rest_direction().into_inner(), Vector3::z());
        assert_relative_eq!(skeleton.bones()[1].rest_direction().into_inner(), Vector3::x());
    }

    #[test]
    fn test_document_name_wins() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.json");
        fs::write(&path, r#"{"name": "Avatar", "bones": [{"name": "Spine", "direction": [0, 1, 0]}]}"#)
            .unwrap();
        assert_eq!(load_skeleton(&path).unwrap().name(), "Avatar");
    }

    #[test]
    fn test_empty_bone_list_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.json");
        fs::write(&path, r#"{"bones": []}"#).unwrap();
        assert!(matches!(
            load_skeleton(&path).unwrap_err(),
            MotionError::MalformedData { .. }
        ));
    }

    #[test]
    fn test_bone_without_geometry_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"bones": [{"name": "Spine"}]}"#).unwrap();
        assert!(matches!(
            load_skeleton(&path).unwrap_err(),
            MotionError::MalformedData { .. }
        ));
    }
}
