use serde::Serialize;

use super::status::StatusConfig;
use super::task::{Priority, TaskRecord};

/// How the keys of a grouping dimension are ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingKind {
    /// Workflow order (user override or Todo → … → Empty)
    Status,
    /// Highest → None
    Priority,
    /// Plain lexicographic order
    Lexical,
}

/// A task property the evaluator can group by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupField {
    /// Status type (`Todo`, `In-Progress`, …)
    Status,
    /// Status name from the configuration
    StatusName,
    Priority,
    Path,
    Folder,
    Filename,
    Tag,
    Due,
}

impl GroupField {
    pub fn parse(s: &str) -> Option<GroupField> {
        match s.trim().to_ascii_lowercase().as_str() {
            "status" | "status.type" => Some(GroupField::Status),
            "status.name" => Some(GroupField::StatusName),
            "priority" => Some(GroupField::Priority),
            "path" => Some(GroupField::Path),
            "folder" => Some(GroupField::Folder),
            "filename" => Some(GroupField::Filename),
            "tag" | "tags" => Some(GroupField::Tag),
            "due" => Some(GroupField::Due),
            _ => None,
        }
    }

    pub fn kind(self) -> GroupingKind {
        match self {
            GroupField::Status | GroupField::StatusName => GroupingKind::Status,
            GroupField::Priority => GroupingKind::Priority,
            _ => GroupingKind::Lexical,
        }
    }

    /// Keys that always get a column on this dimension, even with no tasks.
    pub fn configured_keys(self, statuses: Option<&StatusConfig>) -> Vec<String> {
        match self {
            GroupField::Status => match statuses {
                Some(config) => config.type_labels(),
                None => StatusConfig::default().type_labels(),
            },
            // without configuration, status names are the type labels
            GroupField::StatusName => match statuses {
                Some(config) => config.names(),
                None => StatusConfig::default().type_labels(),
            },
            GroupField::Priority => Priority::RANKED
                .iter()
                .map(|p| p.label().to_string())
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl std::fmt::Display for GroupField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GroupField::Status => "status",
            GroupField::StatusName => "status.name",
            GroupField::Priority => "priority",
            GroupField::Path => "path",
            GroupField::Folder => "folder",
            GroupField::Filename => "filename",
            GroupField::Tag => "tags",
            GroupField::Due => "due",
        };
        write!(f, "{}", s)
    }
}

/// One group of the evaluator's output. `keys` holds one key per grouping
/// level, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskGroup {
    pub keys: Vec<String>,
    pub tasks: Vec<TaskRecord>,
}

/// The evaluator's grouped result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedResult {
    /// Grouping levels, outermost first
    pub groupers: Vec<GroupField>,
    pub groups: Vec<TaskGroup>,
    pub total: usize,
    /// Set when the query could not be evaluated
    pub error: Option<String>,
}

impl GroupedResult {
    pub fn failed(message: impl Into<String>) -> Self {
        GroupedResult {
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

/// A kanban column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub key: String,
    pub tasks: Vec<TaskRecord>,
}

/// A horizontal row of columns. All lanes of a board have the same column keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwimLane {
    pub name: String,
    pub columns: Vec<Column>,
}

impl SwimLane {
    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }
}

/// A materialized board, valid for one render cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum Board {
    Columns {
        columns: Vec<Column>,
    },
    Lanes {
        column_keys: Vec<String>,
        lanes: Vec<SwimLane>,
    },
}

impl Board {
    pub fn column_keys(&self) -> Vec<String> {
        match self {
            Board::Columns { columns } => columns.iter().map(|c| c.key.clone()).collect(),
            Board::Lanes { column_keys, .. } => column_keys.clone(),
        }
    }

    /// Every task on the board, lane by lane, column by column
    pub fn tasks(&self) -> Vec<&TaskRecord> {
        match self {
            Board::Columns { columns } => columns.iter().flat_map(|c| c.tasks.iter()).collect(),
            Board::Lanes { lanes, .. } => lanes
                .iter()
                .flat_map(|l| l.columns.iter())
                .flat_map(|c| c.tasks.iter())
                .collect(),
        }
    }

    pub fn find_task(&self, id: &str) -> Option<&TaskRecord> {
        self.tasks().into_iter().find(|t| t.id == id)
    }
}
