use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::status::Status;

/// Task priority, highest first
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Highest,
    High,
    Medium,
    Low,
    Lowest,
    None,
    /// A priority name the parser does not recognize, kept verbatim
    Other(String),
}

impl Priority {
    /// The recognized priorities in rank order
    pub const RANKED: [Priority; 6] = [
        Priority::Highest,
        Priority::High,
        Priority::Medium,
        Priority::Low,
        Priority::Lowest,
        Priority::None,
    ];

    pub fn label(&self) -> &str {
        match self {
            Priority::Highest => "Highest",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
            Priority::Lowest => "Lowest",
            Priority::None => "None",
            Priority::Other(s) => s,
        }
    }

    /// Rank in Highest→None order; `None` for unrecognized priorities
    pub fn rank(&self) -> Option<usize> {
        Priority::RANKED.iter().position(|p| p == self)
    }

    pub fn from_label(s: &str) -> Priority {
        Priority::RANKED
            .iter()
            .find(|p| p.label() == s)
            .cloned()
            .unwrap_or_else(|| Priority::Other(s.to_string()))
    }

    /// The signifier emoji written on a task line
    pub fn signifier(&self) -> Option<&'static str> {
        match self {
            Priority::Highest => Some("🔺"),
            Priority::High => Some("⏫"),
            Priority::Medium => Some("🔼"),
            Priority::Low => Some("🔽"),
            Priority::Lowest => Some("⏬"),
            Priority::None | Priority::Other(_) => None,
        }
    }
}

/// The six optional dates a task line can carry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled: Option<NaiveDate>,
}

/// Where a task was seen. The line is a hint and may be stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLocation {
    /// Path of the owning note, relative to the vault root
    pub path: PathBuf,
    /// 0-indexed line number at the time of the scan
    pub line: usize,
}

/// Snapshot of one task. Rebuilt on every refresh, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    /// Text after the checkbox up to the first signifier; a verbatim
    /// substring of `original_markdown`
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub dates: TaskDates,
    pub location: TaskLocation,
    pub original_markdown: String,
}

impl TaskRecord {
    pub fn path(&self) -> &Path {
        &self.location.path
    }
}

/// Canonical task identifier, the only derivation used anywhere.
///
/// First 12 hex digits of SHA-256 over the slash-normalized path and the
/// verbatim line. Line numbers are excluded so ids survive edits above the
/// task.
pub fn task_id(path: &Path, original_markdown: &str) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hasher.update(b"\n");
    hasher.update(original_markdown.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..12].to_string()
}
