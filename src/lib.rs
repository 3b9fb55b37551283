//! Kanban boards over plain-markdown checkbox tasks.
//!
//! Grouped task results become complete boards (`ops::board`); dragging a
//! card rewrites the one marker character of its source line
//! (`ops::mutation`); change notifications are debounced and suppressed
//! around moves (`ops::refresh`). `ops::session` ties these together.

pub mod cli;
pub mod io;
pub mod logging;
pub mod model;
pub mod ops;
pub mod parse;
