pub mod source_reader_thread;
