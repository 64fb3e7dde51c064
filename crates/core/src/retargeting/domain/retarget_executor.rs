use super::bone::TargetSkeleton;
use super::retarget_engine::{RetargetEngine, RetargetOutcome};
use crate::shared::actor_id::ActorId;
use crate::shared::error::MotionError;
use crate::shared::landmark::SkeletalFrame;

/// One actor's motion and the skeleton it drives.
#[derive(Clone, Copy, Debug)]
pub struct RetargetJob<'a> {
    pub actor: ActorId,
    pub frames: &'a [SkeletalFrame],
    pub skeleton: &'a TargetSkeleton,
}

/// Runs the retargeting engine over a set of actors.
///
/// Actors share no state, so implementations may run them in any order or
/// in parallel. Outcomes come back sorted by actor ID.
pub trait RetargetExecutor: Send {
    fn execute(
        &self,
        engine: &RetargetEngine,
        jobs: &[RetargetJob<'_>],
    ) -> Result<Vec<RetargetOutcome>, MotionError>;
}

/// Retargets actors one after another on the calling thread.
#[derive(Debug, Default)]
pub struct SequentialRetargetExecutor;

impl RetargetExecutor for SequentialRetargetExecutor {
    fn execute(
        &self,
        engine: &RetargetEngine,
        jobs: &[RetargetJob<'_>],
    ) -> Result<Vec<RetargetOutcome>, MotionError> {
        let mut outcomes = jobs
            .iter()
            .map(|job| engine.retarget_actor(job.actor, job.frames, job.skeleton))
            .collect::<Result<Vec<_>, _>>()?;
        outcomes.sort_by_key(|o| o.actor);
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retargeting::domain::retarget_engine::fixtures::{pose, spine_engine, spine_rig};

    #[test]
    fn test_outcomes_sorted_by_actor() {
        let engine = spine_engine(0.7);
        let rig = spine_rig();
        let frames = vec![pose(0, &[(11, [0.0, 1.0, 0.0], 1.0)])];
        let jobs = [
            RetargetJob {
                actor: ActorId::new(2),
                frames: &frames,
                skeleton: &rig,
            },
            RetargetJob {
                actor: ActorId::new(0),
                frames: &frames,
                skeleton: &rig,
            },
        ];
        let outcomes = SequentialRetargetExecutor.execute(&engine, &jobs).unwrap();
        let actors: Vec<_> = outcomes.iter().map(|o| o.actor).collect();
        assert_eq!(actors, vec![ActorId::new(0), ActorId::new(2)]);
        assert!(outcomes.iter().all(|o| o.keyframes.len() == 1));
    }

    #[test]
    fn test_no_jobs_no_outcomes() {
        let outcomes = SequentialRetargetExecutor
            .execute(&spine_engine(0.7), &[])
            .unwrap();
        assert!(outcomes.is_empty());
    }
}
