pub mod actor_id;
pub mod constants;
pub mod error;
pub mod json_file;
pub mod keyframe;
pub mod landmark;
pub mod motion_sample;
pub mod settings;
pub mod video_metadata;
