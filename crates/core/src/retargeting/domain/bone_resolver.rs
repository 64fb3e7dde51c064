use super::bone::{Bone, TargetSkeleton};

/// One strategy for finding a mapped bone name in a target skeleton.
pub trait BoneNameMatcher: Send + Sync {
    fn find<'a>(&self, wanted: &str, skeleton: &'a TargetSkeleton) -> Option<&'a Bone>;
}

pub struct ExactNameMatcher;

impl BoneNameMatcher for ExactNameMatcher {
    fn find<'a>(&self, wanted: &str, skeleton: &'a TargetSkeleton) -> Option<&'a Bone> {
        skeleton.bones().iter().find(|b| b.name() == wanted)
    }
}

pub struct CaseInsensitiveMatcher;

impl BoneNameMatcher for CaseInsensitiveMatcher {
    fn find<'a>(&self, wanted: &str, skeleton: &'a TargetSkeleton) -> Option<&'a Bone> {
        skeleton
            .bones()
            .iter()
            .find(|b| b.name().eq_ignore_ascii_case(wanted))
    }
}

/// Tries `Left<name>` then `Right<name>`, for rigs that only name one side
/// of a mapped bone.
pub struct SidePrefixMatcher;

impl BoneNameMatcher for SidePrefixMatcher {
    fn find<'a>(&self, wanted: &str, skeleton: &'a TargetSkeleton) -> Option<&'a Bone> {
        ["Left", "Right"].iter().find_map(|side| {
            let prefixed = format!("{side}{wanted}");
            skeleton.bones().iter().find(|b| b.name() == prefixed)
        })
    }
}

/// Ordered list of matchers; the first one that finds a bone wins.
pub struct BoneResolver {
    matchers: Vec<Box<dyn BoneNameMatcher>>,
}

impl BoneResolver {
    pub fn new(matchers: Vec<Box<dyn BoneNameMatcher>>) -> Self {
        Self { matchers }
    }

    pub fn resolve<'a>(&self, wanted: &str, skeleton: &'a TargetSkeleton) -> Option<&'a Bone> {
        self.matchers.iter().find_map(|m| m.find(wanted, skeleton))
    }
}

impl Default for BoneResolver {
    fn default() -> Self {
        Self::new(vec![
            Box::new(ExactNameMatcher),
            Box::new(CaseInsensitiveMatcher),
            Box::new(SidePrefixMatcher),
        ])
    }
}
