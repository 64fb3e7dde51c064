pub mod bone;
pub mod bone_resolver;
pub mod bone_solver;
pub mod mapping_table;
pub mod retarget_engine;
pub mod retarget_executor;
