pub mod lip_sync_loader;
