use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::error::Category;

use super::error::MotionError;

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, MotionError> {
    let json = fs::read_to_string(path).map_err(|e| MotionError::from_io(path, e))?;
    serde_json::from_str(&json).map_err(|e| parse_error(path, e))
}

/// Well-formed JSON that does not fit the document shape is malformed data,
/// located by path, line and column. Anything else stays a JSON error.
fn parse_error(path: &Path, e: serde_json::Error) -> MotionError {
    if e.classify() != Category::Data {
        return MotionError::Json {
            path: path.to_path_buf(),
            source: e,
        };
    }

    let location = format!("{}:{}:{}", path.display(), e.line(), e.column());
    let message = e.to_string();
    let suffix = format!(" at line {} column {}", e.line(), e.column());
    let message = message.strip_suffix(&suffix).unwrap_or(&message);
    match message.split_once(", expected ") {
        Some((found, expected)) => MotionError::malformed(location, expected, found),
        None => MotionError::malformed(location, "document schema", message),
    }
}

/// Pretty-printed, creating parent directories as needed.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), MotionError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| MotionError::from_io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|e| MotionError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    fs::write(path, json).map_err(|e| MotionError::from_io(path, e))
}
