use std::path::PathBuf;

use thiserror::Error;

use super::landmark::FrameIndex;

/// Error taxonomy shared by every stage.
///
/// `UnresolvedBone` and `DegenerateGeometry` never abort a run; they are
/// collected as diagnostics next to the output that skipped them.
#[derive(Error, Debug)]
pub enum MotionError {
    #[error("required document not found: {}", path.display())]
    MissingSource { path: PathBuf },
    #[error("malformed data at {location}: expected {expected}, found {found}")]
    MalformedData {
        location: String,
        expected: String,
        found: String,
    },
    #[error("bone '{bone}' has no match in the target skeleton")]
    UnresolvedBone { bone: String },
    #[error("zero-length direction for bone '{bone}' at frame {frame}")]
    DegenerateGeometry { bone: String, frame: FrameIndex },
    #[error("external tool '{tool}' failed: {detail}")]
    ExternalToolFailure { tool: String, detail: String },
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl MotionError {
    pub fn malformed(
        location: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        MotionError::MalformedData {
            location: location.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn external(tool: impl Into<String>, detail: impl Into<String>) -> Self {
        MotionError::ExternalToolFailure {
            tool: tool.into(),
            detail: detail.into(),
        }
    }

    /// Maps a failed file access, reporting absent files as `MissingSource`.
    pub fn from_io(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            MotionError::MissingSource {
                path: path.to_path_buf(),
            }
        } else {
            MotionError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Whether this error aborts the stage that raised it.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            MotionError::UnresolvedBone { .. } | MotionError::DegenerateGeometry { .. }
        )
    }

    /// Prefixes the location of a schema error with the document it came from.
    pub fn in_document(self, path: &std::path::Path) -> Self {
        match self {
            MotionError::MalformedData {
                location,
                expected,
                found,
            } => MotionError::MalformedData {
                location: format!("{}: {location}", path.display()),
                expected,
                found,
            },
            other => other,
        }
    }
}
