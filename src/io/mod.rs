pub mod config_io;
pub mod scan;
pub mod store;
pub mod watcher;
