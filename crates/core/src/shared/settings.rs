use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::constants::{
    APP_DIR_NAME, DEFAULT_CAMERA_LOCATION, DEFAULT_CAMERA_ROTATION, DEFAULT_INTENSITY_CYCLE,
    DEFAULT_SMOOTHING_WEIGHT, DEFAULT_VISIBILITY_THRESHOLD, SETTINGS_FILE_NAME,
};
use super::error::MotionError;
use super::json_file::{read_json, write_json};

/// Run-wide tunables, persisted as JSON.
///
/// Every field has a default, so a settings file only needs to name the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeSettings {
    pub visibility_threshold: f64,
    pub smoothing_weight: f64,
    pub intensity_cycle: Vec<f64>,
    pub camera_location: [f64; 3],
    pub camera_rotation: [f64; 3],
    /// Mouth category letter → ratio, layered over the built-in table.
    pub mouth_ratios: BTreeMap<String, f64>,
    /// Overrides the source fps when converting cue times to frames.
    pub target_fps: Option<f64>,
    /// Bone name → `[start, end]` landmark IDs, layered over the built-in table.
    pub bone_mapping: BTreeMap<String, [usize; 2]>,
    pub ingest_timeout_secs: Option<u64>,
    pub render_timeout_secs: Option<u64>,
}

impl Default for ForgeSettings {
    fn default() -> Self {
        Self {
            visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
            smoothing_weight: DEFAULT_SMOOTHING_WEIGHT,
            intensity_cycle: DEFAULT_INTENSITY_CYCLE.to_vec(),
            camera_location: DEFAULT_CAMERA_LOCATION,
            camera_rotation: DEFAULT_CAMERA_ROTATION,
            mouth_ratios: BTreeMap::new(),
            target_fps: None,
            bone_mapping: BTreeMap::new(),
            ingest_timeout_secs: None,
            render_timeout_secs: Some(600),
        }
    }
}

impl ForgeSettings {
    /// `<config_dir>/motionforge/settings.json`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    pub fn load(path: &Path) -> Result<Self, MotionError> {
        let settings: Self = read_json(path)?;
        settings.validate().map_err(|e| e.in_document(path))?;
        Ok(settings)
    }

    /// An explicit path must exist. Without one, the per-user file is used
    /// when present and defaults otherwise.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, MotionError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                log::debug!("Loading settings from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), MotionError> {
        write_json(path, self)
    }

    pub fn validate(&self) -> Result<(), MotionError> {
        if !(0.0..=1.0).contains(&self.visibility_threshold) {
            return Err(MotionError::malformed(
                "visibility_threshold",
                "value in [0, 1]",
                self.visibility_threshold.to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.smoothing_weight) {
            return Err(MotionError::malformed(
                "smoothing_weight",
                "value in [0, 1]",
                self.smoothing_weight.to_string(),
            ));
        }
        if self.intensity_cycle.is_empty() {
            return Err(MotionError::malformed(
                "intensity_cycle",
                "at least one intensity",
                "empty list",
            ));
        }
        if let Some(bad) = self
            .intensity_cycle
            .iter()
            .find(|i| !(i.is_finite() && **i >= 0.0))
        {
            return Err(MotionError::malformed(
                "intensity_cycle",
                "finite intensities >= 0",
                bad.to_string(),
            ));
        }
        for (shape, ratio) in &self.mouth_ratios {
            if !(0.0..=1.0).contains(ratio) {
                return Err(MotionError::malformed(
                    format!("mouth_ratios.{shape}"),
                    "ratio in [0, 1]",
                    ratio.to_string(),
                ));
            }
        }
        if let Some(fps) = self.target_fps {
            if !(fps.is_finite() && fps > 0.0) {
                return Err(MotionError::malformed("target_fps", "fps > 0", fps.to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let settings = ForgeSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.intensity_cycle, vec![1.0, 0.7, 1.5]);
        assert_eq!(settings.visibility_threshold, 0.5);
        assert_eq!(settings.smoothing_weight, 0.7);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"smoothing_weight": 0.5, "target_fps": 24.0}"#).unwrap();

        let settings = ForgeSettings::load(&path).unwrap();
        assert_eq!(settings.smoothing_weight, 0.5);
        assert_eq!(settings.target_fps, Some(24.0));
        assert_eq!(settings.visibility_threshold, 0.5);
        assert_eq!(settings.camera_location, [0.0, -3.0, 1.5]);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut settings = ForgeSettings::default();
        settings.mouth_ratios.insert("D".to_string(), 0.5);
        settings.bone_mapping.insert("Neck".to_string(), [11, 0]);

        settings.save(&path).unwrap();
        assert_eq!(ForgeSettings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_explicit_missing_path_is_missing_source() {
        let dir = TempDir::new().unwrap();
        let err = ForgeSettings::load_or_default(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, MotionError::MissingSource { .. }));
    }

    #[test]
    fn test_invalid_json_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        let err = ForgeSettings::load(&path).unwrap_err();
        assert!(matches!(err, MotionError::Json { .. }));
    }

    #[rstest]
    #[case::threshold_above_one(r#"{"visibility_threshold": 1.5}"#)]
    #[case::negative_weight(r#"{"smoothing_weight": -0.1}"#)]
    #[case::empty_cycle(r#"{"intensity_cycle": []}"#)]
    #[case::negative_intensity(r#"{"intensity_cycle": [1.0, -2.0]}"#)]
    #[case::ratio_out_of_range(r#"{"mouth_ratios": {"A": 2.0}}"#)]
    #[case::zero_fps(r#"{"target_fps": 0.0}"#)]
    fn test_out_of_range_values_rejected(#[case] json: &str) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, json).unwrap();
        let err = ForgeSettings::load(&path).unwrap_err();
        assert!(matches!(err, MotionError::MalformedData { .. }));
    }
}
