/// Body landmarks per skeletal detection.
pub const POSE_LANDMARK_COUNT: usize = 33;

/// Landmark whose x coordinate anchors a skeletal detection (the nose).
pub const POSE_ANCHOR_LANDMARK: usize = 0;

/// Inner-lip centers in the face mesh layout.
pub const UPPER_LIP_CENTER_ID: usize = 13;
pub const LOWER_LIP_CENTER_ID: usize = 14;

/// Upper bound on sampled flow vectors kept per camera motion sample.
pub const MAX_FLOW_VECTORS: usize = 400;

/// Actor keys at or above this are rejected when a document is loaded.
pub const MAX_ACTOR_ID: u32 = 1024;

pub const DEFAULT_VISIBILITY_THRESHOLD: f64 = 0.5;
pub const DEFAULT_SMOOTHING_WEIGHT: f64 = 0.7;

/// Variant intensity cycle: base, calm, nervous.
pub const DEFAULT_INTENSITY_CYCLE: [f64; 3] = [1.0, 0.7, 1.5];

/// Default camera rig: eye height behind the subjects, pitched slightly down.
pub const DEFAULT_CAMERA_LOCATION: [f64; 3] = [0.0, -3.0, 1.5];
pub const DEFAULT_CAMERA_ROTATION: [f64; 3] = [1.1, 0.0, 0.0];

pub const DATASET_FILE_NAME: &str = "mission_raw.json";
pub const MISSION_FILE_NAME: &str = "mission_ready.json";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const APP_DIR_NAME: &str = "motionforge";
