pub mod board;
pub mod config;
pub mod status;
pub mod task;

pub use board::*;
pub use config::*;
pub use status::*;
pub use task::*;
