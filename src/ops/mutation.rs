use std::path::PathBuf;

use crate::io::store::{StoreError, TaskStore};
use crate::model::board::GroupField;
use crate::model::task::TaskRecord;
use crate::ops::status_map::StatusMapper;
use crate::parse::marker::{Rewrite, is_task_line, rewrite_marker};
use crate::parse::task_parser::CodeFence;

/// Error type for moving a task between columns
#[derive(Debug, thiserror::Error)]
pub enum MoveError {
    #[error("no status marker for column '{0}'")]
    UnmappableColumn(String),
    #[error("note not found: {}", .0.display())]
    ResourceNotFound(PathBuf),
    #[error("task line not found in {path}: {description}")]
    TaskLineNotFound { path: PathBuf, description: String },
    #[error("task not on the board: {0}")]
    UnknownTask(String),
    #[error("task id '{0}' is ambiguous")]
    AmbiguousTask(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a successful move did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The task was already in the target column; storage untouched
    Unchanged,
    /// The line already carried the target marker; nothing written
    AlreadyPresent,
    /// The note was rewritten; `line` is the 0-indexed line that changed
    Written { line: usize },
}

/// Rewrites a task's status marker in its note.
///
/// Targets are column keys of the board's column dimension, status type
/// labels unless `with_column_field` says otherwise.
pub struct MutationEngine<'a, S: TaskStore> {
    store: &'a S,
    mapper: StatusMapper<'a>,
    column_field: GroupField,
}

impl<'a, S: TaskStore> MutationEngine<'a, S> {
    pub fn new(store: &'a S, mapper: StatusMapper<'a>) -> Self {
        MutationEngine {
            store,
            mapper,
            column_field: GroupField::Status,
        }
    }

    pub fn with_column_field(mut self, field: GroupField) -> Self {
        self.column_field = field;
        self
    }

    /// Move `task` to the column `target`. Either the note is rewritten in
    /// one write or storage is left untouched.
    pub fn apply_move(&self, task: &TaskRecord, target: &str) -> Result<MoveOutcome, MoveError> {
        if self.already_in(task, target) {
            return Ok(MoveOutcome::Unchanged);
        }

        let marker = single_marker(&self.mapper.to_marker(target))
            .ok_or_else(|| MoveError::UnmappableColumn(target.to_string()))?;

        let path = task.path();
        let text = self
            .store
            .read_text(path)?
            .ok_or_else(|| MoveError::ResourceNotFound(path.to_path_buf()))?;

        let Some((line_no, rewritten)) = rewrite_task_line(&text, task, marker) else {
            return Err(MoveError::TaskLineNotFound {
                path: path.to_path_buf(),
                description: task.description.clone(),
            });
        };

        match rewritten {
            None => Ok(MoveOutcome::AlreadyPresent),
            Some(new_text) => {
                self.store.write_text(path, &new_text)?;
                tracing::info!(
                    path = %path.display(),
                    line = line_no,
                    column = target,
                    marker = %marker,
                    "task moved"
                );
                Ok(MoveOutcome::Written { line: line_no })
            }
        }
    }

    /// Whether `target` is the column the task already sits in
    fn already_in(&self, task: &TaskRecord, target: &str) -> bool {
        if task.status.name == target {
            return true;
        }
        // on a name board another status's name is another column
        if self.column_field == GroupField::StatusName && self.mapper.is_status_name(target) {
            return false;
        }
        task.status.kind.label() == target
            || task.status.kind.code() == target
            || self.mapper.to_column_key(&task.status.marker) == target
    }
}

/// A marker must be exactly one character that keeps the checkbox intact
fn single_marker(marker: &str) -> Option<char> {
    let mut chars = marker.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !matches!(c, ']' | '[' | '\n' | '\r') => Some(c),
        _ => None,
    }
}

/// Find the task's line by content and rewrite its marker.
///
/// The first task line containing the description wins; line numbers
/// recorded at scan time are not trusted. Lines in fenced code blocks are not
/// tasks, as in `parse_document`. An empty description only matches the
/// recorded line verbatim. Returns the line index and the new text, or
/// `None` for the text when the marker is already in place.
fn rewrite_task_line(
    text: &str,
    task: &TaskRecord,
    marker: char,
) -> Option<(usize, Option<String>)> {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();

    let mut fence = CodeFence::default();
    let (idx, content, ending) = lines.iter().enumerate().find_map(|(idx, raw)| {
        let (content, ending) = split_ending(raw);
        let matches = !fence.is_code(content)
            && is_task_line(content)
            && if task.description.is_empty() {
                content == task.original_markdown
            } else {
                content.contains(task.description.as_str())
            };
        matches.then_some((idx, content, ending))
    })?;

    let new_line = match rewrite_marker(content, marker) {
        Rewrite::Changed(line) => line,
        Rewrite::Unchanged(_) | Rewrite::Malformed(_) => return Some((idx, None)),
    };

    let mut out = String::with_capacity(text.len() + 4);
    for (i, raw) in lines.iter().enumerate() {
        if i == idx {
            out.push_str(&new_line);
            out.push_str(ending);
        } else {
            out.push_str(raw);
        }
    }
    Some((idx, Some(out)))
}

/// Split a line into content and its terminator (`\n`, `\r\n`, or none)
fn split_ending(raw: &str) -> (&str, &str) {
    if let Some(content) = raw.strip_suffix("\r\n") {
        (content, &raw[content.len()..])
    } else if let Some(content) = raw.strip_suffix('\n') {
        (content, &raw[content.len()..])
    } else {
        (raw, "")
    }
}
