pub mod keyframe_sink;
