use super::identity_assigner::{FrameAssignment, IdentityAssigner};
use crate::shared::actor_id::ActorId;
use crate::shared::landmark::{FacialFrame, FrameIndex, SkeletalFrame};

/// Re-ranks subjects left to right on every frame.
///
/// Actor "0" is whoever is leftmost in that frame, so IDs swap when subjects
/// cross or when one leaves the picture. Faces go to the body whose nose is
/// horizontally closest; with no bodies at all they fall back to actor "0".
#[derive(Debug, Default)]
pub struct RankIdentityAssigner;

impl RankIdentityAssigner {
    pub fn new() -> Self {
        Self
    }
}

impl IdentityAssigner for RankIdentityAssigner {
    fn assign(
        &mut self,
        frame: FrameIndex,
        mut skeletal: Vec<SkeletalFrame>,
        facial: Vec<FacialFrame>,
    ) -> FrameAssignment {
        // Stable sort keeps detection order among equal anchors.
        skeletal.sort_by(|a, b| a.anchor_x().total_cmp(&b.anchor_x()));
        let anchors: Vec<f64> = skeletal.iter().map(SkeletalFrame::anchor_x).collect();

        let skeletal: Vec<(ActorId, SkeletalFrame)> = skeletal
            .into_iter()
            .enumerate()
            .map(|(rank, s)| (ActorId::from_rank(rank), s))
            .collect();

        let mut assigned_faces = Vec::with_capacity(facial.len());
        for face in facial {
            let Some(face_x) = face.anchor_x() else {
                log::debug!("Frame {frame}: dropping face without usable landmarks");
                continue;
            };
            let actor = nearest_rank(&anchors, face_x)
                .map(ActorId::from_rank)
                .unwrap_or(ActorId::PRIMARY);
            assigned_faces.push((actor, face));
        }

        FrameAssignment {
            frame,
            skeletal,
            facial: assigned_faces,
        }
    }
}

/// Rank whose anchor is closest to `x`; the lowest rank wins ties.
fn nearest_rank(anchors: &[f64], x: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (rank, anchor) in anchors.iter().enumerate() {
        let distance = (anchor - x).abs();
        match best {
            Some((_, d)) if distance >= d => {}
            _ => best = Some((rank, distance)),
        }
    }
    best.map(|(rank, _)| rank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::landmark::fixtures::skeletal;
    use crate::shared::landmark::LandmarkPoint;
    use rstest::rstest;

    fn face_at(x: f64) -> FacialFrame {
        FacialFrame::new(0, 0.0, 0.5).with_lips(
            Some(LandmarkPoint::new(x, 0.5, 0.0)),
            Some(LandmarkPoint::new(x, 0.52, 0.0)),
        )
    }

    fn anchors_of(assignment: &FrameAssignment) -> Vec<(u32, f64)> {
        assignment
            .skeletal
            .iter()
            .map(|(id, s)| (id.index() as u32, s.anchor_x()))
            .collect()
    }

    #[test]
    fn test_ranks_left_to_right() {
        let mut assigner = RankIdentityAssigner::new();
        let frames = vec![skeletal(0, 0.7), skeletal(0, 0.1), skeletal(0, 0.4)];
        let assignment = assigner.assign(0, frames, vec![]);
        assert_eq!(anchors_of(&assignment), vec![(0, 0.1), (1, 0.4), (2, 0.7)]);
    }

    #[test]
    fn test_rerank_is_per_frame() {
        let mut assigner = RankIdentityAssigner::new();
        let first = assigner.assign(0, vec![skeletal(0, 0.2), skeletal(0, 0.8)], vec![]);
        let second = assigner.assign(1, vec![skeletal(1, 0.8)], vec![]);
        assert_eq!(anchors_of(&first), vec![(0, 0.2), (1, 0.8)]);
        assert_eq!(anchors_of(&second), vec![(0, 0.8)]);
    }

    #[rstest]
    #[case::middle(0.42, 1)]
    #[case::far_left(0.0, 0)]
    #[case::far_right(0.95, 2)]
    fn test_face_goes_to_nearest_body(#[case] face_x: f64, #[case] expected: u32) {
        let mut assigner = RankIdentityAssigner::new();
        let bodies = vec![skeletal(0, 0.1), skeletal(0, 0.4), skeletal(0, 0.7)];
        let assignment = assigner.assign(0, bodies, vec![face_at(face_x)]);
        assert_eq!(assignment.facial.len(), 1);
        assert_eq!(assignment.facial[0].0, ActorId::new(expected));
    }

    #[test]
    fn test_equidistant_face_goes_to_lower_rank() {
        let mut assigner = RankIdentityAssigner::new();
        let bodies = vec![skeletal(0, 0.75), skeletal(0, 0.25)];
        let assignment = assigner.assign(0, bodies, vec![face_at(0.5)]);
        assert_eq!(assignment.facial[0].0, ActorId::PRIMARY);
    }

    #[test]
    fn test_faces_without_bodies_collapse_to_primary() {
        let mut assigner = RankIdentityAssigner::new();
        let assignment = assigner.assign(0, vec![], vec![face_at(0.1), face_at(0.9)]);
        assert!(assignment.skeletal.is_empty());
        assert!(assignment.facial.iter().all(|(id, _)| *id == ActorId::PRIMARY));
        assert_eq!(assignment.facial.len(), 2);
    }

    #[test]
    fn test_face_without_points_is_dropped() {
        let mut assigner = RankIdentityAssigner::new();
        let blank = FacialFrame::new(0, 0.0, 0.0);
        let assignment = assigner.assign(0, vec![skeletal(0, 0.5)], vec![blank]);
        assert!(assignment.facial.is_empty());
    }

    #[test]
    fn test_face_falls_back_to_mesh_anchor() {
        let mut assigner = RankIdentityAssigner::new();
        let face = FacialFrame::new(0, 0.0, 0.0).with_mesh(vec![LandmarkPoint::new(0.68, 0.5, 0.0)]);
        let bodies = vec![skeletal(0, 0.1), skeletal(0, 0.7)];
        let assignment = assigner.assign(0, bodies, vec![face]);
        assert_eq!(assignment.facial[0].0, ActorId::new(1));
    }

    #[test]
    fn test_empty_frame_yields_empty_assignment() {
        let mut assigner = RankIdentityAssigner::new();
        let assignment = assigner.assign(9, vec![], vec![]);
        assert_eq!(assignment.frame, 9);
        assert_eq!(assignment.actor_count(), 0);
        assert!(assignment.facial.is_empty());
    }
}
