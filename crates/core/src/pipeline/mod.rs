pub mod forge_keyframes_use_case;
pub mod infrastructure;
pub mod pipeline_logger;
pub mod scan_motion_use_case;
