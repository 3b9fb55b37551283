use serde::{Deserialize, Serialize};

/// The canonical category of a status, independent of its marker or name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusType {
    Todo,
    InProgress,
    Done,
    Cancelled,
    NonTask,
    Empty,
}

impl StatusType {
    pub const ALL: [StatusType; 6] = [
        StatusType::Todo,
        StatusType::InProgress,
        StatusType::Done,
        StatusType::Cancelled,
        StatusType::NonTask,
        StatusType::Empty,
    ];

    /// Human-facing name, used as the column key on status boards
    pub fn label(self) -> &'static str {
        match self {
            StatusType::Todo => "Todo",
            StatusType::InProgress => "In-Progress",
            StatusType::Done => "Done",
            StatusType::Cancelled => "Cancelled",
            StatusType::NonTask => "Non-Task",
            StatusType::Empty => "Empty",
        }
    }

    /// Identifier used in configuration files and internal group keys
    pub fn code(self) -> &'static str {
        match self {
            StatusType::Todo => "TODO",
            StatusType::InProgress => "IN_PROGRESS",
            StatusType::Done => "DONE",
            StatusType::Cancelled => "CANCELLED",
            StatusType::NonTask => "NON_TASK",
            StatusType::Empty => "EMPTY",
        }
    }

    /// Position in the default workflow ordering
    pub fn rank(self) -> usize {
        match self {
            StatusType::Todo => 0,
            StatusType::InProgress => 1,
            StatusType::Done => 2,
            StatusType::Cancelled => 3,
            StatusType::NonTask => 4,
            StatusType::Empty => 5,
        }
    }

    /// Match a label (`In-Progress`) or a code (`IN_PROGRESS`)
    pub fn from_key(key: &str) -> Option<StatusType> {
        StatusType::ALL
            .into_iter()
            .find(|t| t.label() == key || t.code() == key)
    }
}

impl std::fmt::Display for StatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Fixed marker table used when no status configuration is available.
pub const FALLBACK_STATUSES: [(&str, StatusType); 4] = [
    (" ", StatusType::Todo),
    ("/", StatusType::InProgress),
    ("x", StatusType::Done),
    ("-", StatusType::Cancelled),
];

/// One entry of the status configuration: `{marker, name, type}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDescriptor {
    pub marker: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: StatusType,
}

impl StatusDescriptor {
    pub fn new(marker: &str, name: &str, kind: StatusType) -> Self {
        StatusDescriptor {
            marker: marker.to_string(),
            name: name.to_string(),
            kind,
        }
    }
}

/// The status of a single task as observed in its source line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub marker: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: StatusType,
}

/// An ordered list of status descriptors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusConfig {
    pub statuses: Vec<StatusDescriptor>,
}

impl Default for StatusConfig {
    fn default() -> Self {
        StatusConfig {
            statuses: vec![
                StatusDescriptor::new(" ", "Todo", StatusType::Todo),
                StatusDescriptor::new("/", "In Progress", StatusType::InProgress),
                StatusDescriptor::new("x", "Done", StatusType::Done),
                StatusDescriptor::new("-", "Cancelled", StatusType::Cancelled),
            ],
        }
    }
}

impl StatusConfig {
    pub fn new(statuses: Vec<StatusDescriptor>) -> Self {
        StatusConfig { statuses }
    }

    pub fn by_marker(&self, marker: &str) -> Option<&StatusDescriptor> {
        self.statuses.iter().find(|s| s.marker == marker)
    }

    pub fn by_name(&self, name: &str) -> Option<&StatusDescriptor> {
        self.statuses.iter().find(|s| s.name == name)
    }

    pub fn by_type(&self, kind: StatusType) -> Option<&StatusDescriptor> {
        self.statuses.iter().find(|s| s.kind == kind)
    }

    /// Distinct status type labels in configuration order
    pub fn type_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        for s in &self.statuses {
            let label = s.kind.label().to_string();
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }

    /// Distinct status names in configuration order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for s in &self.statuses {
            if !names.contains(&s.name) {
                names.push(s.name.clone());
            }
        }
        names
    }
}

/// Resolve the status of a marker: configuration first, then the fallback
/// table, then an `Unknown` todo.
pub fn status_for_marker(statuses: Option<&StatusConfig>, marker: &str) -> Status {
    if let Some(found) = statuses.and_then(|c| c.by_marker(marker)) {
        return Status {
            marker: found.marker.clone(),
            name: found.name.clone(),
            kind: found.kind,
        };
    }
    if let Some((_, kind)) = FALLBACK_STATUSES.iter().find(|(m, _)| *m == marker) {
        return Status {
            marker: marker.to_string(),
            name: kind.label().to_string(),
            kind: *kind,
        };
    }
    Status {
        marker: marker.to_string(),
        name: "Unknown".to_string(),
        kind: StatusType::Todo,
    }
}
