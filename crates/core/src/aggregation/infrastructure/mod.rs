pub mod json_dataset_store;
