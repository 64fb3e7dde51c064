pub mod detections;
pub mod landmark_source;
pub mod mouth_normalizer;
