use std::collections::BTreeMap;
use std::time::Instant;

/// Observer for pipeline orchestration events.
///
/// Use cases report through this trait so the CLI, tests and any future
/// front end can watch a run without changing the orchestration code.
pub trait PipelineLogger: Send {
    /// Frames handled so far out of the announced total.
    fn progress(&mut self, current: usize, total: usize);

    /// Time spent in a named stage for one unit of work.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// A named count or measurement (keyframes emitted, actors seen, ...).
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// End-of-run report. Default: no-op.
    fn summary(&self) {}
}

/// Discards everything. Used by tests and library callers that do their own
/// reporting.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StageStats {
    pub calls: usize,
    pub total_ms: f64,
    pub max_ms: f64,
}

impl StageStats {
    pub fn mean_ms(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.total_ms / self.calls as f64
        }
    }
}

/// Forwards events to the `log` facade and keeps per-stage statistics for
/// the closing summary.
///
/// Progress lines are emitted every `throttle_frames` frames and on the
/// last one.
pub struct LogPipelineLogger {
    throttle_frames: usize,
    stages: BTreeMap<String, StageStats>,
    metrics: BTreeMap<String, f64>,
    frames_seen: usize,
    started: Instant,
}

impl LogPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            stages: BTreeMap::new(),
            metrics: BTreeMap::new(),
            frames_seen: 0,
            started: Instant::now(),
        }
    }

    pub fn stage(&self, stage: &str) -> Option<&StageStats> {
        self.stages.get(stage)
    }

    /// Metrics accumulate: reporting the same name twice adds the values.
    pub fn metric_total(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    pub fn frames_seen(&self) -> usize {
        self.frames_seen
    }

    /// `None` until something has been recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.stages.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Run summary ({} frames, {elapsed:.2}s):",
            self.frames_seen
        )];
        for (name, stats) in &self.stages {
            lines.push(format!(
                "  {name:10} x{:<6} mean {:7.2}ms  max {:7.2}ms  total {:8.1}ms",
                stats.calls,
                stats.mean_ms(),
                stats.max_ms,
                stats.total_ms
            ));
        }
        for (name, value) in &self.metrics {
            lines.push(format!("  {name}: {value}"));
        }
        if self.frames_seen > 0 && elapsed > 0.0 {
            lines.push(format!(
                "  Throughput: {:.1} frames/s",
                self.frames_seen as f64 / elapsed
            ));
        }
        Some(lines.join("\n"))
    }
}

impl Default for LogPipelineLogger {
    fn default() -> Self {
        Self::new(100)
    }
}

impl PipelineLogger for LogPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames_seen = self.frames_seen.max(current);
        if current % self.throttle_frames == 0 || current == total {
            if total > 0 {
                let pct = current as f64 / total as f64 * 100.0;
                log::info!("Frame {current}/{total} ({pct:.1}%)");
            } else {
                log::info!("Frame {current}");
            }
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        let stats = self.stages.entry(stage.to_string()).or_default();
        stats.calls += 1;
        stats.total_ms += duration_ms;
        stats.max_ms = stats.max_ms.max(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        *self.metrics.entry(name.to_string()).or_default() += value;
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}
