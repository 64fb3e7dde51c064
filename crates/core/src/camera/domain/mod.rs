pub mod camera_pose;
pub mod camera_synthesizer;
pub mod intensity;
