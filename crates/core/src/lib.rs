pub mod aggregation;
pub mod camera;
pub mod identity;
pub mod ingestion;
pub mod mission;
pub mod mouth;
pub mod pipeline;
pub mod render;
pub mod retargeting;
pub mod shared;
