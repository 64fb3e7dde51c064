use std::thread;

use crate::retargeting::domain::retarget_engine::{RetargetEngine, RetargetOutcome};
use crate::retargeting::domain::retarget_executor::{RetargetExecutor, RetargetJob};
use crate::shared::actor_id::ActorId;
use crate::shared::error::MotionError;

const DEFAULT_WORKERS: usize = 4;

/// Retargets actors on a small pool of scoped worker threads.
///
/// Layout: `jobs queue → N workers → results queue → caller`
///
/// Each actor is handled start to finish by a single worker, so its frames
/// are still processed in order.
pub struct ThreadedRetargetExecutor {
    workers: usize,
}

impl ThreadedRetargetExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }
}

impl Default for ThreadedRetargetExecutor {
    fn default() -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(DEFAULT_WORKERS);
        Self::new(workers)
    }
}

type JobResult = (ActorId, Result<RetargetOutcome, MotionError>);

impl RetargetExecutor for ThreadedRetargetExecutor {
    fn execute(
        &self,
        engine: &RetargetEngine,
        jobs: &[RetargetJob<'_>],
    ) -> Result<Vec<RetargetOutcome>, MotionError> {
        if jobs.is_empty() {
            return Ok(Vec::new());
        }
        let workers = self.workers.min(jobs.len());
        log::debug!("Retargeting {} actors on {workers} workers", jobs.len());

        let mut results: Vec<JobResult> = thread::scope(|scope| {
            let (job_tx, job_rx) = crossbeam_channel::bounded(jobs.len());
            let (result_tx, result_rx) = crossbeam_channel::bounded::<JobResult>(jobs.len());

            for job in jobs {
                // Capacity equals the job count and the receiver is alive.
                let _ = job_tx.send(*job);
            }
            drop(job_tx);

            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for job in job_rx {
                        let outcome = engine.retarget_actor(job.actor, job.frames, job.skeleton);
                        if result_tx.send((job.actor, outcome)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(result_tx);

            result_rx.iter().collect()
        });

        results.sort_by_key(|(actor, _)| *actor);
        results.into_iter().map(|(_, outcome)| outcome).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retargeting::domain::retarget_engine::fixtures::{pose, spine_engine, spine_rig};
    use crate::retargeting::domain::retarget_executor::SequentialRetargetExecutor;
    use crate::shared::landmark::SkeletalFrame;

    fn frames(lean: f64) -> Vec<SkeletalFrame> {
        (0..20)
            .map(|f| pose(f, &[(11, [lean * f as f64 / 20.0, 1.0, 0.0], 1.0)]))
            .collect()
    }

    #[test]
    fn test_matches_sequential() {
        let engine = spine_engine(0.7);
        let rig = spine_rig();
        let per_actor: Vec<Vec<SkeletalFrame>> = (0..5).map(|i| frames(i as f64 * 0.3)).collect();
        let jobs: Vec<RetargetJob<'_>> = per_actor
            .iter()
            .enumerate()
            .rev()
            .map(|(i, f)| RetargetJob {
                actor: ActorId::from_rank(i),
                frames: f,
                skeleton: &rig,
            })
            .collect();

        let threaded = ThreadedRetargetExecutor::new(3).execute(&engine, &jobs).unwrap();
        let sequential = SequentialRetargetExecutor.execute(&engine, &jobs).unwrap();

        assert_eq!(threaded.len(), 5);
        for (t, s) in threaded.iter().zip(&sequential) {
            assert_eq!(t.actor, s.actor);
            assert_eq!(t.keyframes, s.keyframes);
        }
    }

    #[test]
    fn test_error_from_any_actor_is_returned() {
        let engine = spine_engine(0.7);
        let rig = spine_rig();
        let good = frames(0.5);
        let bad = vec![pose(3, &[]), pose(1, &[])];
        let jobs = [
            RetargetJob {
                actor: ActorId::new(0),
                frames: &good,
                skeleton: &rig,
            },
            RetargetJob {
                actor: ActorId::new(1),
                frames: &bad,
                skeleton: &rig,
            },
        ];
        let err = ThreadedRetargetExecutor::new(2).execute(&engine, &jobs).unwrap_err();
        assert!(matches!(err, MotionError::MalformedData { .. }));
    }

    #[test]
    fn test_zero_workers_clamped() {
        let engine = spine_engine(0.7);
        let rig = spine_rig();
        let f = frames(0.1);
        let jobs = [RetargetJob {
            actor: ActorId::PRIMARY,
            frames: &f,
            skeleton: &rig,
        }];
        let outcomes = ThreadedRetargetExecutor::new(0).execute(&engine, &jobs).unwrap();
        assert_eq!(outcomes[0].keyframes.len(), 20);
    }
}
