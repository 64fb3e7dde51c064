pub mod actor_table;
pub mod dataset_validator;
pub mod mission_dataset;
pub mod motion_aggregator;
