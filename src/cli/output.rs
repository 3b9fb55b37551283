use serde::Serialize;

use crate::model::board::{Board, Column};
use crate::model::status::{FALLBACK_STATUSES, StatusConfig};
use crate::model::task::TaskRecord;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub description: String,
    pub status: String,
    #[serde(rename = "type")]
    pub status_type: String,
    pub marker: String,
    pub priority: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    pub path: String,
    pub line: usize,
}

#[derive(Serialize)]
pub struct ColumnJson {
    pub key: String,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct LaneJson {
    pub name: String,
    pub columns: Vec<ColumnJson>,
}

#[derive(Serialize)]
pub struct BoardJson {
    pub columns: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cells: Vec<ColumnJson>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lanes: Vec<LaneJson>,
}

#[derive(Serialize)]
pub struct StatusJson {
    pub marker: String,
    pub name: String,
    #[serde(rename = "type")]
    pub status_type: String,
}

#[derive(Serialize)]
pub struct MoveJson {
    pub id: String,
    pub column: String,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &TaskRecord) -> TaskJson {
    TaskJson {
        id: task.id.clone(),
        description: task.description.clone(),
        status: task.status.name.clone(),
        status_type: task.status.kind.label().to_string(),
        marker: task.status.marker.clone(),
        priority: task.priority.label().to_string(),
        tags: task.tags.clone(),
        due: task.dates.due.map(|d| d.format("%Y-%m-%d").to_string()),
        path: task.path().to_string_lossy().replace('\\', "/"),
        line: task.location.line + 1,
    }
}

fn column_to_json(column: &Column) -> ColumnJson {
    ColumnJson {
        key: column.key.clone(),
        tasks: column.tasks.iter().map(task_to_json).collect(),
    }
}

pub fn board_to_json(board: &Board) -> BoardJson {
    match board {
        Board::Columns { columns } => BoardJson {
            columns: board.column_keys(),
            cells: columns.iter().map(column_to_json).collect(),
            lanes: Vec::new(),
        },
        Board::Lanes { column_keys, lanes } => BoardJson {
            columns: column_keys.clone(),
            cells: Vec::new(),
            lanes: lanes
                .iter()
                .map(|lane| LaneJson {
                    name: lane.name.clone(),
                    columns: lane.columns.iter().map(column_to_json).collect(),
                })
                .collect(),
        },
    }
}

/// The status table in effect: configured, or the built-in four
pub fn statuses_to_json(statuses: Option<&StatusConfig>) -> Vec<StatusJson> {
    match statuses {
        Some(config) => config
            .statuses
            .iter()
            .map(|s| StatusJson {
                marker: s.marker.clone(),
                name: s.name.clone(),
                status_type: s.kind.code().to_string(),
            })
            .collect(),
        None => FALLBACK_STATUSES
            .iter()
            .map(|(marker, kind)| StatusJson {
                marker: marker.to_string(),
                name: kind.label().to_string(),
                status_type: kind.code().to_string(),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Short id shown in listings; `bw move` accepts any unique prefix
pub fn short_id(id: &str) -> &str {
    id.get(..7).unwrap_or(id)
}

/// Format a single task as a one-line summary
pub fn format_task_line(task: &TaskRecord) -> String {
    let mut line = format!(
        "[{}] {} {}",
        task.status.marker,
        short_id(&task.id),
        task.description
    );
    if let Some(signifier) = task.priority.signifier() {
        line.push(' ');
        line.push_str(signifier);
    }
    if let Some(due) = task.dates.due {
        line.push_str(&format!(" 📅 {}", due.format("%Y-%m-%d")));
    }
    line
}

fn format_columns(columns: &[Column], indent: &str, lines: &mut Vec<String>) {
    for column in columns {
        lines.push(format!("{}{} ({})", indent, column.key, column.tasks.len()));
        for task in &column.tasks {
            lines.push(format!("{}  {}", indent, format_task_line(task)));
        }
    }
}

/// Format a board, column by column (and lane by lane)
pub fn format_board(board: &Board) -> Vec<String> {
    let mut lines = Vec::new();
    match board {
        Board::Columns { columns } => format_columns(columns, "", &mut lines),
        Board::Lanes { lanes, .. } => {
            for (i, lane) in lanes.iter().enumerate() {
                if i > 0 {
                    lines.push(String::new());
                }
                lines.push(format!("== {} ==", lane.name));
                format_columns(&lane.columns, "  ", &mut lines);
            }
        }
    }
    lines
}

/// Format a task listing with locations
pub fn format_task_listing(tasks: &[TaskRecord]) -> Vec<String> {
    tasks
        .iter()
        .map(|t| {
            format!(
                "{}  {}:{}",
                format_task_line(t),
                t.path().display(),
                t.location.line + 1
            )
        })
        .collect()
}
