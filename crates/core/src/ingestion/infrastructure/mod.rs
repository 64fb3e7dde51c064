pub mod json_lines_source;
