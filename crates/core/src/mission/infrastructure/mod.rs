pub mod json_mission_store;
