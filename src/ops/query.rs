//! A small reference evaluator: filter the scanned tasks, then group them.
//!
//! This is the collaborator that produces grouped results; it deliberately
//! offers fixed filters and group fields rather than a query language.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::io::scan::scan_vault;
use crate::model::board::{GroupField, GroupedResult, TaskGroup};
use crate::model::config::BoardConfig;
use crate::model::status::{StatusConfig, StatusType};
use crate::model::task::TaskRecord;

/// A query that could not be evaluated; shown inline instead of a board
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct QueryError(pub String);

/// Which tasks make it onto the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFilter {
    /// Any-of, without `#`. Empty keeps everything.
    pub tags: Vec<String>,
    /// Path prefixes. Empty keeps everything.
    pub paths: Vec<String>,
    pub include_done: bool,
}

impl Default for TaskFilter {
    fn default() -> Self {
        TaskFilter {
            tags: Vec::new(),
            paths: Vec::new(),
            include_done: true,
        }
    }
}

impl TaskFilter {
    pub fn matches(&self, task: &TaskRecord) -> bool {
        if !self.include_done
            && matches!(task.status.kind, StatusType::Done | StatusType::Cancelled)
        {
            return false;
        }
        if !self.tags.is_empty() {
            let wanted = |t: &String| {
                self.tags
                    .iter()
                    .any(|w| w.trim_start_matches('#').eq_ignore_ascii_case(t))
            };
            if !task.tags.iter().any(wanted) {
                return false;
            }
        }
        if !self.paths.is_empty() {
            let path = normalized_path(task.path());
            if !self.paths.iter().any(|p| path.starts_with(p.as_str())) {
                return false;
            }
        }
        true
    }
}

/// Filter plus grouping levels, outermost first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub filter: TaskFilter,
    pub group_by: Vec<GroupField>,
}

impl Query {
    /// Build a query from configuration strings. Unknown field names are
    /// reported as a query error.
    pub fn from_config(config: &BoardConfig) -> Result<Query, QueryError> {
        let mut group_by = Vec::new();
        if let Some(lanes) = &config.board.lanes_by {
            group_by.push(parse_field(lanes)?);
        }
        group_by.push(parse_field(&config.board.group_by)?);
        Ok(Query {
            filter: TaskFilter {
                tags: config.filter.tags.clone(),
                paths: config.filter.paths.clone(),
                include_done: config.filter.include_done,
            },
            group_by,
        })
    }
}

fn parse_field(s: &str) -> Result<GroupField, QueryError> {
    GroupField::parse(s).ok_or_else(|| QueryError(format!("unknown group field '{}'", s)))
}

/// Filter and group tasks. Groups appear in task discovery order.
pub fn evaluate(tasks: &[TaskRecord], query: &Query) -> GroupedResult {
    let mut groups: IndexMap<Vec<String>, Vec<TaskRecord>> = IndexMap::new();
    let mut total = 0;

    for task in tasks.iter().filter(|t| query.filter.matches(t)) {
        total += 1;
        for keys in group_keys(task, &query.group_by) {
            groups.entry(keys).or_default().push(task.clone());
        }
    }

    GroupedResult {
        groupers: query.group_by.clone(),
        groups: groups
            .into_iter()
            .map(|(keys, tasks)| TaskGroup { keys, tasks })
            .collect(),
        total,
        error: None,
    }
}

/// Every key path a task belongs to. Multi-valued fields (tags) fan out.
fn group_keys(task: &TaskRecord, fields: &[GroupField]) -> Vec<Vec<String>> {
    let mut paths: Vec<Vec<String>> = vec![Vec::new()];
    for field in fields {
        let values = field_values(task, *field);
        paths = paths
            .into_iter()
            .flat_map(|prefix| {
                values.iter().map(move |v| {
                    let mut next = prefix.clone();
                    next.push(v.clone());
                    next
                })
            })
            .collect();
    }
    paths
}

fn field_values(task: &TaskRecord, field: GroupField) -> Vec<String> {
    match field {
        // Category plus its workflow rank; resolved to a label downstream
        GroupField::Status => vec![format!(
            "{}#{}",
            task.status.kind.code(),
            task.status.kind.rank()
        )],
        GroupField::StatusName => vec![task.status.name.clone()],
        GroupField::Priority => vec![task.priority.label().to_string()],
        GroupField::Path => vec![normalized_path(task.path())],
        GroupField::Folder => {
            let folder = task
                .path()
                .parent()
                .map(normalized_path)
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| "/".to_string());
            vec![folder]
        }
        GroupField::Filename => vec![
            task.path()
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        ],
        GroupField::Tag => {
            if task.tags.is_empty() {
                vec!["(No tags)".to_string()]
            } else {
                task.tags.iter().map(|t| format!("#{}", t)).collect()
            }
        }
        GroupField::Due => vec![
            task.dates
                .due
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "No due date".to_string()),
        ],
    }
}

fn normalized_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Something that yields a fresh grouped result on demand
pub trait TaskSource {
    fn evaluate(&self) -> GroupedResult;
}

/// Scans a vault directory on every evaluation
#[derive(Debug, Clone)]
pub struct VaultSource {
    root: PathBuf,
    config: BoardConfig,
}

impl VaultSource {
    pub fn new(root: impl Into<PathBuf>, config: BoardConfig) -> Self {
        VaultSource {
            root: root.into(),
            config,
        }
    }

    pub fn set_config(&mut self, config: BoardConfig) {
        self.config = config;
    }

    fn statuses(&self) -> Option<StatusConfig> {
        self.config.status_config()
    }
}

impl TaskSource for VaultSource {
    fn evaluate(&self) -> GroupedResult {
        let query = match Query::from_config(&self.config) {
            Ok(q) => q,
            Err(e) => return GroupedResult::failed(e.0),
        };
        match scan_vault(&self.root, self.statuses().as_ref()) {
            Ok(tasks) => evaluate(&tasks, &query),
            Err(e) => GroupedResult::failed(e.to_string()),
        }
    }
}
