pub mod board;
pub mod mutation;
pub mod order;
pub mod query;
pub mod refresh;
pub mod session;
pub mod status_map;
