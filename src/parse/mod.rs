pub mod marker;
pub mod task_parser;

pub use marker::{Rewrite, is_task_line, marker_of, rewrite_marker};
pub use task_parser::{CodeFence, parse_document, parse_task_line};
