pub mod skeleton_library;
pub mod skeleton_loader;
pub mod threaded_retarget_executor;
