use std::collections::BTreeMap;
use std::time::Instant;

use crate::camera::domain::camera_pose::CameraPose;
use crate::camera::domain::camera_synthesizer::CameraMotionSynthesizer;
use crate::camera::domain::intensity::IntensitySchedule;
use crate::mission::domain::mission_document::MissionDocument;
use crate::mouth::domain::mouth_cue::MouthRatioTable;
use crate::mouth::domain::mouth_drive::{MouthDriveEngine, MouthSource};
use crate::render::domain::keyframe_sink::KeyframeSink;
use crate::retargeting::domain::bone::TargetSkeleton;
use crate::retargeting::domain::bone_resolver::BoneResolver;
use crate::retargeting::domain::mapping_table::MappingTable;
use crate::retargeting::domain::retarget_engine::{RetargetConfig, RetargetEngine};
use crate::retargeting::domain::retarget_executor::{RetargetExecutor, RetargetJob};
use crate::shared::actor_id::ActorId;
use crate::shared::error::MotionError;
use crate::shared::settings::ForgeSettings;

use super::pipeline_logger::PipelineLogger;

/// What one forge run produced.
#[derive(Debug)]
pub struct ForgeReport {
    pub variant: usize,
    pub intensity: f64,
    pub actors_retargeted: usize,
    pub bone_keyframes: usize,
    pub mouth_keyframes: usize,
    pub mouth_source: MouthSource,
    pub camera_keyframes: usize,
    /// Unresolved bones and degenerate segments, in actor order.
    pub diagnostics: Vec<MotionError>,
}

impl ForgeReport {
    pub fn total_keyframes(&self) -> usize {
        self.bone_keyframes + self.mouth_keyframes + self.camera_keyframes
    }
}

/// Produces one variant's keyframes from a compiled mission.
///
/// Bones for every actor with a skeleton, then the mouth control, then the
/// camera path, all written to the sink in that order. Each run starts from
/// frame 0 with fresh state.
pub struct ForgeKeyframesUseCase {
    engine: RetargetEngine,
    executor: Box<dyn RetargetExecutor>,
    mouth_table: MouthRatioTable,
    target_fps: Option<f64>,
    camera: CameraMotionSynthesizer,
    schedule: IntensitySchedule,
    logger: Box<dyn PipelineLogger>,
}

impl ForgeKeyframesUseCase {
    pub fn new(
        engine: RetargetEngine,
        executor: Box<dyn RetargetExecutor>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            engine,
            executor,
            mouth_table: MouthRatioTable::default(),
            target_fps: None,
            camera: CameraMotionSynthesizer::default(),
            schedule: IntensitySchedule::default(),
            logger,
        }
    }

    /// Wires every component from user settings.
    pub fn from_settings(
        settings: &ForgeSettings,
        executor: Box<dyn RetargetExecutor>,
        logger: Box<dyn PipelineLogger>,
    ) -> Result<Self, MotionError> {
        let mapping = MappingTable::default().with_overrides(&settings.bone_mapping)?;
        let engine = RetargetEngine::new(
            mapping,
            BoneResolver::default(),
            RetargetConfig {
                visibility_threshold: settings.visibility_threshold,
                smoothing_weight: settings.smoothing_weight,
            },
        );
        Ok(Self::new(engine, executor, logger)
            .with_mouth_table(MouthRatioTable::default().with_overrides(&settings.mouth_ratios)?)
            .with_target_fps(settings.target_fps)
            .with_camera(CameraMotionSynthesizer::new(CameraPose::new(
                settings.camera_location,
                settings.camera_rotation,
            )))
            .with_schedule(IntensitySchedule::new(settings.intensity_cycle.clone())))
    }

    pub fn with_mouth_table(mut self, table: MouthRatioTable) -> Self {
        self.mouth_table = table;
        self
    }

    /// Frame rate used to place mouth cues. Defaults to the source fps.
    pub fn with_target_fps(mut self, fps: Option<f64>) -> Self {
        self.target_fps = fps;
        self
    }

    pub fn with_camera(mut self, camera: CameraMotionSynthesizer) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_schedule(mut self, schedule: IntensitySchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn execute(
        &mut self,
        mission: &MissionDocument,
        skeletons: &BTreeMap<ActorId, TargetSkeleton>,
        variant: usize,
        sink: &mut dyn KeyframeSink,
    ) -> Result<ForgeReport, MotionError> {
        let dataset = &mission.dataset;
        let intensity = self.schedule.intensity_for(variant);
        self.logger.info(&format!(
            "Forging variant {variant} of {} (intensity {intensity}, mode {})",
            mission.metadata.mission_id, mission.metadata.mode
        ));

        let started = Instant::now();
        let jobs: Vec<RetargetJob<'_>> = dataset
            .actors
            .iter()
            .filter_map(|(actor, motion)| match skeletons.get(&actor) {
                Some(skeleton) => Some(RetargetJob {
                    actor,
                    frames: &motion.pose_frames,
                    skeleton,
                }),
                None => {
                    log::warn!("No skeleton for actor {actor}; its motion is skipped");
                    None
                }
            })
            .collect();
        let outcomes = self.executor.execute(&self.engine, &jobs)?;
        self.logger
            .timing("retarget", started.elapsed().as_secs_f64() * 1000.0);

        let started = Instant::now();
        let fps = self.target_fps.unwrap_or(dataset.metadata.fps);
        let primary_mouth = dataset
            .actors
            .get(ActorId::PRIMARY)
            .map(|a| a.mouth_frames.as_slice())
            .unwrap_or_default();
        // Cue frames stop at the clip's end, counted at the output rate.
        let clip_frames =
            (dataset.frame_count() as f64 / dataset.metadata.fps * fps).round() as usize;
        let mouth = MouthDriveEngine::new(self.mouth_table.clone(), fps)
            .with_frame_count(clip_frames)
            .drive(&mission.mouth.cues, primary_mouth);
        self.logger
            .timing("mouth", started.elapsed().as_secs_f64() * 1000.0);

        let started = Instant::now();
        let camera = self.camera.synthesize(&dataset.camera_motion, intensity)?;
        self.logger
            .timing("camera", started.elapsed().as_secs_f64() * 1000.0);

        let started = Instant::now();
        let mut bone_keyframes = 0;
        let mut diagnostics = Vec::new();
        for outcome in outcomes {
            for keyframe in &outcome.keyframes {
                sink.insert(&keyframe.to_op())?;
            }
            bone_keyframes += outcome.keyframes.len();
            diagnostics.extend(outcome.diagnostics);
        }
        for op in mouth.to_ops() {
            sink.insert(&op)?;
        }
        for keyframe in &camera {
            sink.insert(&keyframe.to_op())?;
        }
        sink.finish()?;
        self.logger
            .timing("emit", started.elapsed().as_secs_f64() * 1000.0);

        if !diagnostics.is_empty() {
            log::warn!(
                "Variant {variant}: {} retargeting diagnostics",
                diagnostics.len()
            );
        }

        let report = ForgeReport {
            variant,
            intensity,
            actors_retargeted: jobs.len(),
            bone_keyframes,
            mouth_keyframes: mouth.keyframes.len(),
            mouth_source: mouth.source,
            camera_keyframes: camera.len(),
            diagnostics,
        };
        self.logger
            .metric("bone_keyframes", report.bone_keyframes as f64);
        self.logger
            .metric("mouth_keyframes", report.mouth_keyframes as f64);
        self.logger
            .metric("camera_keyframes", report.camera_keyframes as f64);
        self.logger.summary();
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::domain::mission_document::fixtures::{at, dataset};
    use crate::mission::domain::mission_document::{compile_mission, MissionMode, MouthBlock};
    use crate::mouth::domain::mouth_cue::{MouthCue, MouthShape};
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::render::domain::keyframe_sink::RecordingSink;
    use crate::retargeting::domain::bone::Bone;
    use crate::retargeting::domain::retarget_executor::SequentialRetargetExecutor;
    use crate::retargeting::infrastructure::threaded_retarget_executor::ThreadedRetargetExecutor;
    use crate::shared::keyframe::{KeyframeTarget, KeyframeValue};
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn rig() -> TargetSkeleton {
        TargetSkeleton::new(
            "rig",
            vec![
                Bone::from_direction("Spine", Vector3::y()),
                Bone::from_direction("leftupperarm", Vector3::x()),
                Bone::from_direction("Tail", Vector3::z()),
            ],
        )
    }

    fn skeletons(actors: &[u32]) -> BTreeMap<ActorId, TargetSkeleton> {
        actors.iter().map(|&id| (ActorId::new(id), rig())).collect()
    }

    fn use_case() -> ForgeKeyframesUseCase {
        ForgeKeyframesUseCase::from_settings(
            &ForgeSettings::default(),
            Box::new(SequentialRetargetExecutor),
            Box::new(NullPipelineLogger),
        )
        .unwrap()
    }

    fn drama(frames: usize, cues: Vec<MouthCue>) -> MissionDocument {
        let block = MouthBlock {
            cues,
            metadata: Default::default(),
        };
        compile_mission(dataset(frames), None, Some(block), MissionMode::Drama, at())
    }

    fn kind(target: &KeyframeTarget) -> u8 {
        match target {
            KeyframeTarget::Bone { .. } => 0,
            KeyframeTarget::MouthControl { .. } => 1,
            KeyframeTarget::Camera => 2,
        }
    }

    #[test]
    fn test_emits_bones_then_mouth_then_camera() {
        let mission = compile_mission(dataset(4), None, None, MissionMode::Silent, at());
        let mut sink = RecordingSink::new();

        let report = use_case()
            .execute(&mission, &skeletons(&[0, 1]), 0, &mut sink)
            .unwrap();

        let kinds: Vec<u8> = sink.ops().iter().map(|op| kind(&op.target)).collect();
        let mut sorted = kinds.clone();
        sorted.sort();
        assert_eq!(kinds, sorted);
        assert!(sink.is_finished());

        // Spine and LeftUpperArm resolve on both actors, four frames each.
        assert_eq!(report.actors_retargeted, 2);
        assert_eq!(report.bone_keyframes, 2 * 2 * 4);
        assert_eq!(report.camera_keyframes, 4);
        assert_eq!(report.total_keyframes(), sink.ops().len());
    }

    #[test]
    fn test_silent_mode_uses_measured_openness() {
        let mission = compile_mission(dataset(3), None, None, MissionMode::Silent, at());
        let mut sink = RecordingSink::new();

        let report = use_case()
            .execute(&mission, &skeletons(&[0, 1]), 0, &mut sink)
            .unwrap();

        assert_eq!(report.mouth_source, MouthSource::Continuous);
        assert_eq!(report.mouth_keyframes, 3);
        let mouth: Vec<_> = sink
            .ops()
            .iter()
            .filter(|op| kind(&op.target) == 1)
            .collect();
        assert!(mouth.iter().all(|op| op.value == KeyframeValue::Scalar(0.25)));
        assert!(mouth.iter().all(|op| op.target
            == KeyframeTarget::MouthControl {
                actor: ActorId::PRIMARY
            }));
    }

    #[test]
    fn test_cues_take_priority() {
        let mission = drama(
            10,
            vec![MouthCue {
                start: 0.0,
                end: 0.1,
                shape: MouthShape::C,
            }],
        );
        let mut sink = RecordingSink::new();
        let report = use_case()
            .execute(&mission, &skeletons(&[0, 1]), 0, &mut sink)
            .unwrap();

        // 0.1s at 30 fps covers frames 0..=3.
        assert_eq!(report.mouth_source, MouthSource::Symbolic);
        assert_eq!(report.mouth_keyframes, 4);
    }

    #[test]
    fn test_target_fps_overrides_source_rate() {
        let mission = drama(
            10,
            vec![MouthCue {
                start: 0.0,
                end: 0.1,
                shape: MouthShape::C,
            }],
        );
        let mut forge = use_case().with_target_fps(Some(60.0));
        let report = forge
            .execute(&mission, &skeletons(&[0, 1]), 0, &mut RecordingSink::new())
            .unwrap();
        assert_eq!(report.mouth_keyframes, 7);
    }

    #[test]
    fn test_cues_stop_at_clip_end() {
        let mission = drama(
            3,
            vec![MouthCue {
                start: 0.0,
                end: 100_000.0,
                shape: MouthShape::A,
            }],
        );
        let mut sink = RecordingSink::new();
        let report = use_case()
            .execute(&mission, &skeletons(&[0, 1]), 0, &mut sink)
            .unwrap();

        assert_eq!(report.mouth_keyframes, 3);
        let last_mouth = sink
            .ops()
            .iter()
            .filter(|op| kind(&op.target) == 1)
            .map(|op| op.frame)
            .max();
        assert_eq!(last_mouth, Some(2));
    }

    #[test]
    fn test_variant_selects_intensity() {
        let mission = compile_mission(dataset(2), None, None, MissionMode::Silent, at());
        let mut forge = use_case();
        let intensities: Vec<f64> = (0..4)
            .map(|variant| {
                forge
                    .execute(&mission, &skeletons(&[0, 1]), variant, &mut RecordingSink::new())
                    .unwrap()
                    .intensity
            })
            .collect();
        assert_eq!(intensities, vec![1.0, 0.7, 1.5, 1.0]);
    }

    #[test]
    fn test_rerun_is_reproducible() {
        let mission = compile_mission(dataset(5), None, None, MissionMode::Silent, at());
        let mut forge = use_case();
        let mut first = RecordingSink::new();
        let mut second = RecordingSink::new();
        forge.execute(&mission, &skeletons(&[0, 1]), 2, &mut first).unwrap();
        forge.execute(&mission, &skeletons(&[0, 1]), 2, &mut second).unwrap();
        assert_eq!(first.ops(), second.ops());
    }

    #[test]
    fn test_unresolved_bones_reported() {
        let mission = compile_mission(dataset(1), None, None, MissionMode::Silent, at());
        let report = use_case()
            .execute(&mission, &skeletons(&[0]), 0, &mut RecordingSink::new())
            .unwrap();

        assert_eq!(report.actors_retargeted, 1);
        assert!(!report.diagnostics.is_empty());
        assert!(report
            .diagnostics
            .iter()
            .all(|d| matches!(d, MotionError::UnresolvedBone { .. })));
    }

    #[test]
    fn test_threaded_executor_matches_sequential() {
        let mission = compile_mission(dataset(6), None, None, MissionMode::Silent, at());
        let mut sequential = RecordingSink::new();
        let mut threaded = RecordingSink::new();

        use_case()
            .execute(&mission, &skeletons(&[0, 1]), 1, &mut sequential)
            .unwrap();
        ForgeKeyframesUseCase::from_settings(
            &ForgeSettings::default(),
            Box::new(ThreadedRetargetExecutor::new(2)),
            Box::new(NullPipelineLogger),
        )
        .unwrap()
        .execute(&mission, &skeletons(&[0, 1]), 1, &mut threaded)
        .unwrap();

        assert_eq!(sequential.ops(), threaded.ops());
    }

    #[test]
    fn test_camera_starts_from_base_pose_plus_first_delta() {
        let mission = compile_mission(dataset(1), None, None, MissionMode::Silent, at());
        let mut sink = RecordingSink::new();
        use_case()
            .execute(&mission, &skeletons(&[]), 0, &mut sink)
            .unwrap();

        let camera = sink.ops().last().unwrap();
        match &camera.value {
            KeyframeValue::CameraTransform { location, .. } => {
                // mean flow (0.5, -0.25) * 0.1, magnitude 0.2 * 0.01
                assert_relative_eq!(location[0], 0.05, epsilon = 1e-12);
                assert_relative_eq!(location[1], -3.025, epsilon = 1e-12);
                assert_relative_eq!(location[2], 1.502, epsilon = 1e-12);
            }
            other => panic!("expected camera transform, got {other:?}"),
        }
    }
}
