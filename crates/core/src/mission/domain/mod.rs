pub mod mission_document;
