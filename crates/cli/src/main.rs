use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};

use motionforge_core::aggregation::domain::dataset_validator::validate_dataset;
use motionforge_core::aggregation::infrastructure::json_dataset_store::{
    load_dataset, load_dataset_unchecked, save_dataset,
};
use motionforge_core::identity::domain::rank_identity_assigner::RankIdentityAssigner;
use motionforge_core::ingestion::infrastructure::json_lines_source::JsonLinesSource;
use motionforge_core::mission::domain::mission_document::{compile_mission, MissionMode};
use motionforge_core::mission::infrastructure::json_mission_store::{
    load_mission, load_speech, save_mission,
};
use motionforge_core::mouth::infrastructure::lip_sync_loader::load_lip_sync;
use motionforge_core::pipeline::forge_keyframes_use_case::ForgeKeyframesUseCase;
use motionforge_core::pipeline::pipeline_logger::LogPipelineLogger;
use motionforge_core::pipeline::scan_motion_use_case::ScanMotionUseCase;
use motionforge_core::render::infrastructure::command_renderer::CommandRenderer;
use motionforge_core::render::infrastructure::json_lines_keyframe_writer::JsonLinesKeyframeWriter;
use motionforge_core::retargeting::domain::retarget_executor::{
    RetargetExecutor, SequentialRetargetExecutor,
};
use motionforge_core::retargeting::infrastructure::skeleton_library::SkeletonLibrary;
use motionforge_core::retargeting::infrastructure::threaded_retarget_executor::ThreadedRetargetExecutor;
use motionforge_core::shared::settings::ForgeSettings;

/// Actor motion extraction, retargeting and camera synthesis.
#[derive(Parser)]
#[command(name = "motionforge")]
struct Cli {
    /// Settings file (default: <config dir>/motionforge/settings.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a motion dataset from a detection stream (JSON lines).
    Scan {
        /// Detection stream produced by the landmark detector.
        detections: PathBuf,

        /// Dataset file to write.
        output: PathBuf,

        /// Seconds to wait for each frame before giving up.
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Check a dataset against its invariants and list every problem.
    Validate {
        dataset: PathBuf,
    },

    /// Merge a dataset with speech and lip-sync output into a mission.
    Compile {
        dataset: PathBuf,

        /// Mission file to write.
        output: PathBuf,

        /// SILENT or DRAMA.
        #[arg(long, default_value = "SILENT")]
        mode: MissionMode,

        /// Speech block from the transcription step.
        #[arg(long)]
        speech: Option<PathBuf>,

        /// Lip-sync cue document (used in DRAMA mode).
        #[arg(long)]
        lip_sync: Option<PathBuf>,
    },

    /// Produce keyframes for one or more variants of a mission.
    Forge {
        mission: PathBuf,

        /// Directory with actor_<id>.json and/or default.json skeletons.
        #[arg(long)]
        skeletons: PathBuf,

        /// Directory for variant_<n>.jsonl keyframe files.
        #[arg(long)]
        out: PathBuf,

        /// Number of variants to produce.
        #[arg(long, default_value = "1")]
        variants: usize,

        /// Retarget worker threads (1 = sequential).
        #[arg(long, default_value = "1")]
        threads: usize,

        /// Renderer to run on each keyframe file.
        #[arg(long)]
        render: Option<PathBuf>,

        /// Renderer argument; `{keyframes}` is replaced by the file path.
        #[arg(long = "render-arg", allow_hyphen_values = true)]
        render_args: Vec<String>,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = ForgeSettings::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Command::Scan {
            detections,
            output,
            timeout,
        } => run_scan(&settings, &detections, &output, timeout),
        Command::Validate { dataset } => run_validate(&dataset),
        Command::Compile {
            dataset,
            output,
            mode,
            speech,
            lip_sync,
        } => run_compile(
            &dataset,
            &output,
            mode,
            speech.as_deref(),
            lip_sync.as_deref(),
        ),
        Command::Forge {
            mission,
            skeletons,
            out,
            variants,
            threads,
            render,
            render_args,
        } => {
            let renderer = render.map(|program| {
                CommandRenderer::new(program)
                    .args(render_args)
                    .with_timeout(settings.render_timeout_secs.map(Duration::from_secs))
            });
            run_forge(
                &settings,
                &mission,
                &skeletons,
                &out,
                variants,
                threads,
                renderer.as_ref(),
            )
        }
    }
}

fn run_scan(
    settings: &ForgeSettings,
    detections: &Path,
    output: &Path,
    timeout: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let timeout = timeout
        .or(settings.ingest_timeout_secs)
        .map(Duration::from_secs);
    let dataset = ScanMotionUseCase::new(
        Box::new(JsonLinesSource::new()),
        Box::new(RankIdentityAssigner::new()),
        Box::new(LogPipelineLogger::default()),
    )
    .with_timeout(timeout)
    .execute(detections, Utc::now())?;

    save_dataset(&dataset, output)?;
    println!(
        "{}: {} frames, {} actors -> {}",
        dataset.metadata.session_id,
        dataset.frame_count(),
        dataset.actors.len(),
        output.display()
    );
    Ok(())
}

fn run_validate(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = load_dataset_unchecked(path)?;
    let report = validate_dataset(&dataset);

    for warning in &report.warnings {
        println!("warning: {warning}");
    }
    for error in &report.errors {
        println!("error: {error}");
    }
    if !report.is_valid() {
        return Err(format!(
            "{} failed validation with {} error(s)",
            path.display(),
            report.errors.len()
        )
        .into());
    }
    println!(
        "{} is valid ({} frames, {} actors)",
        path.display(),
        dataset.frame_count(),
        dataset.actors.len()
    );
    Ok(())
}

fn run_compile(
    dataset: &Path,
    output: &Path,
    mode: MissionMode,
    speech: Option<&Path>,
    lip_sync: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = load_dataset(dataset)?;
    let speech = speech.map(load_speech).transpose()?;
    let lip_sync = lip_sync.map(load_lip_sync).transpose()?.map(Into::into);

    let mission = compile_mission(dataset, speech, lip_sync, mode, Utc::now());
    save_mission(&mission, output)?;
    println!(
        "{} ({mode}, lip sync {}) -> {}",
        mission.metadata.mission_id,
        mission.mouth.status(),
        output.display()
    );
    Ok(())
}

fn run_forge(
    settings: &ForgeSettings,
    mission: &Path,
    skeletons: &Path,
    out: &Path,
    variants: usize,
    threads: usize,
    renderer: Option<&CommandRenderer>,
) -> Result<(), Box<dyn std::error::Error>> {
    if variants == 0 {
        return Err("--variants must be at least 1".into());
    }
    let mission = load_mission(mission)?;
    let skeletons = SkeletonLibrary::new(skeletons).load_all(&mission.dataset.actors.ids())?;

    let executor: Box<dyn RetargetExecutor> = if threads > 1 {
        Box::new(ThreadedRetargetExecutor::new(threads))
    } else {
        Box::new(SequentialRetargetExecutor)
    };
    let mut forge = ForgeKeyframesUseCase::from_settings(
        settings,
        executor,
        Box::new(LogPipelineLogger::default()),
    )?;

    for variant in 0..variants {
        let path = out.join(format!("variant_{variant}.jsonl"));
        let mut writer = JsonLinesKeyframeWriter::create(&path)?;
        let report = forge.execute(&mission, &skeletons, variant, &mut writer)?;
        for diagnostic in &report.diagnostics {
            log::debug!("variant {variant}: {diagnostic}");
        }
        println!(
            "variant {variant}: intensity {}, {} keyframes ({} bone, {} mouth from {:?}, {} camera), {} diagnostics -> {}",
            report.intensity,
            report.total_keyframes(),
            report.bone_keyframes,
            report.mouth_keyframes,
            report.mouth_source,
            report.camera_keyframes,
            report.diagnostics.len(),
            path.display()
        );

        if let Some(renderer) = renderer {
            let outcome = renderer.render(&path)?;
            println!(
                "variant {variant}: rendered in {:.1}s",
                outcome.elapsed.as_secs_f64()
            );
        }
    }
    Ok(())
}
