pub mod mouth_cue;
pub mod mouth_drive;
