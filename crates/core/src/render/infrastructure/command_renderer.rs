use std::ffi::OsString;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::shared::error::MotionError;

/// Placeholder replaced by the keyframe file path in renderer arguments.
pub const KEYFRAMES_PLACEHOLDER: &str = "{keyframes}";

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const MAX_DIAGNOSTIC_CHARS: usize = 500;

#[derive(Debug)]
pub struct RenderOutcome {
    pub elapsed: Duration,
    pub stderr: String,
}

/// Runs the external rendering tool over a keyframe file.
///
/// Arguments containing `{keyframes}` get the file path substituted; when no
/// argument does, the path is appended last.
#[derive(Clone, Debug)]
pub struct CommandRenderer {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandRenderer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn tool_name(&self) -> String {
        self.program.display().to_string()
    }

    pub fn command_args(&self, keyframes: &Path) -> Vec<OsString> {
        let path = keyframes.to_string_lossy();
        let mut substituted = false;
        let mut args: Vec<OsString> = self
            .args
            .iter()
            .map(|a| {
                if a.contains(KEYFRAMES_PLACEHOLDER) {
                    substituted = true;
                    OsString::from(a.replace(KEYFRAMES_PLACEHOLDER, &path))
                } else {
                    OsString::from(a)
                }
            })
            .collect();
        if !substituted {
            args.push(keyframes.as_os_str().to_owned());
        }
        args
    }

    /// Blocks until the renderer exits or the timeout elapses.
    ///
    /// A timed-out renderer is killed; nothing it produced is trusted.
    pub fn render(&self, keyframes: &Path) -> Result<RenderOutcome, MotionError> {
        let tool = self.tool_name();
        let start = Instant::now();
        log::info!("Running renderer {tool} on {}", keyframes.display());

        let mut child = Command::new(&self.program)
            .args(self.command_args(keyframes))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => MotionError::external(&tool, "program not found"),
                _ => MotionError::external(&tool, format!("failed to start: {e}")),
            })?;

        let stderr_reader = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut captured = String::new();
                let _ = pipe.read_to_string(&mut captured);
                captured
            })
        });

        let waited = wait_with_deadline(&mut child, self.timeout.map(|t| start + t));
        let elapsed = start.elapsed();
        // A killed renderer may leave grandchildren holding the pipe open.
        let stderr = match waited {
            Ok(Some(_)) => stderr_reader
                .and_then(|handle| handle.join().ok())
                .unwrap_or_default(),
            _ => String::new(),
        };

        match waited {
            Ok(Some(status)) if status.success() => {
                log::info!("Renderer finished in {:.1}s", elapsed.as_secs_f64());
                Ok(RenderOutcome { elapsed, stderr })
            }
            Ok(Some(status)) => Err(MotionError::external(
                tool,
                format!("exited with {status}: {}", truncate(&stderr)),
            )),
            Ok(None) => Err(MotionError::external(
                tool,
                format!("timed out after {:.1}s", elapsed.as_secs_f64()),
            )),
            Err(e) => Err(MotionError::external(tool, format!("wait failed: {e}"))),
        }
    }
}

/// `Ok(None)` when the deadline passed and the child was killed.
fn wait_with_deadline(
    child: &mut Child,
    deadline: Option<Instant>,
) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            log::warn!("Renderer exceeded its deadline, killing pid {}", child.id());
            child.kill()?;
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn truncate(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(MAX_DIAGNOSTIC_CHARS) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_substituted() {
        let renderer = CommandRenderer::new("blender")
            .args(["--background", "--python", "worker.py", "--", "--keyframes={keyframes}"]);
        let args = renderer.command_args(Path::new("/tmp/k.jsonl"));
        assert_eq!(args.len(), 5);
        assert_eq!(args[4], OsString::from("--keyframes=/tmp/k.jsonl"));
    }

    #[test]
    fn test_path_appended_without_placeholder() {
        let renderer = CommandRenderer::new("render").arg("-q");
        let args = renderer.command_args(Path::new("k.jsonl"));
        assert_eq!(args, vec![OsString::from("-q"), OsString::from("k.jsonl")]);
    }

    #[test]
    fn test_truncate_long_diagnostics() {
        let long = "x".repeat(MAX_DIAGNOSTIC_CHARS + 20);
        let out = truncate(&long);
        assert_eq!(out.len(), MAX_DIAGNOSTIC_CHARS + 3);
        assert!(out.ends_with("..."));
        assert_eq!(truncate("  short\n"), "short");
    }

    #[test]
    fn test_missing_program() {
        let renderer = CommandRenderer::new("motionforge-no-such-renderer");
        match renderer.render(Path::new("k.jsonl")) {
            Err(MotionError::ExternalToolFailure { detail, .. }) => {
                assert_eq!(detail, "program not found");
            }
            other => panic!("expected ExternalToolFailure, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_success() {
        let renderer = CommandRenderer::new("sh").args(["-c", "exit 0", "sh"]);
        assert!(renderer.render(Path::new("k.jsonl")).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_captures_stderr() {
        let renderer = CommandRenderer::new("sh").args(["-c", "echo boom >&2; exit 3", "sh"]);
        match renderer.render(Path::new("k.jsonl")) {
            Err(MotionError::ExternalToolFailure { tool, detail }) => {
                assert_eq!(tool, "sh");
                assert!(detail.contains("boom"), "{detail}");
            }
            other => panic!("expected ExternalToolFailure, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_renderer() {
        let renderer = CommandRenderer::new("sh")
            .args(["-c", "exec sleep 5", "sh"])
            .with_timeout(Some(Duration::from_millis(100)));
        let start = Instant::now();
        match renderer.render(Path::new("k.jsonl")) {
            Err(MotionError::ExternalToolFailure { detail, .. }) => {
                assert!(detail.starts_with("timed out"), "{detail}");
            }
            other => panic!("expected ExternalToolFailure, got {other:?}"),
        }
        assert!(start.elapsed() < Duration::from_secs(4));
    }
}
