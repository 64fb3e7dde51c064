pub mod command_renderer;
pub mod json_lines_keyframe_writer;
