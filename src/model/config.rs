use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::status::{StatusConfig, StatusDescriptor};

/// Configuration from boardwalk.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub board: BoardSection,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    /// Empty means "no status configuration": the fallback table applies.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statuses: Vec<StatusDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSection {
    /// Column dimension
    #[serde(default = "default_group_by")]
    pub group_by: String,
    /// Optional swim lane dimension
    #[serde(default)]
    pub lanes_by: Option<String>,
    /// User column order for status boards. Empty means workflow order.
    #[serde(default)]
    pub column_order: Vec<String>,
}

impl Default for BoardSection {
    fn default() -> Self {
        BoardSection {
            group_by: default_group_by(),
            lanes_by: None,
            column_order: Vec::new(),
        }
    }
}

fn default_group_by() -> String {
    "status".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Keep tasks carrying any of these tags (without `#`)
    #[serde(default)]
    pub tags: Vec<String>,
    /// Keep tasks whose path starts with any of these prefixes
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default = "default_true")]
    pub include_done: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            tags: Vec::new(),
            paths: Vec::new(),
            include_done: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        RefreshConfig {
            debounce_ms: default_debounce_ms(),
            settle_ms: default_settle_ms(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_settle_ms() -> u64 {
    1000
}

impl RefreshConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Ranked column keys chosen by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderingPolicy {
    pub column_order: Vec<String>,
}

impl OrderingPolicy {
    pub fn new(column_order: Vec<String>) -> Self {
        OrderingPolicy { column_order }
    }
}

impl BoardConfig {
    pub fn status_config(&self) -> Option<StatusConfig> {
        if self.statuses.is_empty() {
            None
        } else {
            Some(StatusConfig::new(self.statuses.clone()))
        }
    }

    pub fn ordering_policy(&self) -> OrderingPolicy {
        OrderingPolicy::new(self.board.column_order.clone())
    }
}
