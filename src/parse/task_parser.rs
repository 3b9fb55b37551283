use std::path::Path;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::model::status::{StatusConfig, status_for_marker};
use crate::model::task::{Priority, TaskDates, TaskLocation, TaskRecord, task_id};
use crate::parse::marker::{checkbox_end, is_task_line, marker_of};

/// Emoji that start the metadata tail of a task line
const SIGNIFIERS: [&str; 11] = [
    "🔺", "⏫", "🔼", "🔽", "⏬", "➕", "🛫", "⏳", "📅", "✅", "❌",
];

static DATE_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(➕|🛫|⏳|📅|✅|❌)\x{FE0F}?[ \t]*([0-9]{4}-[0-9]{2}-[0-9]{2})")
        .expect("date pattern is valid")
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)#([^\s#]+)").expect("tag pattern is valid"));

/// Tracks fenced code blocks while a note is scanned line by line
#[derive(Debug, Default)]
pub struct CodeFence {
    open: Option<&'static str>,
}

impl CodeFence {
    /// Feed the next line. True when it is a fence or inside a fenced block.
    pub fn is_code(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        if let Some(open) = self.open {
            if trimmed.starts_with(open) {
                self.open = None;
            }
            return true;
        }
        for open in ["```", "~~~"] {
            if trimmed.starts_with(open) {
                self.open = Some(open);
                return true;
            }
        }
        false
    }
}

/// Parse every checkbox task in a note. Lines inside fenced code blocks are
/// skipped.
pub fn parse_document(
    path: &Path,
    text: &str,
    statuses: Option<&StatusConfig>,
) -> Vec<TaskRecord> {
    let mut fence = CodeFence::default();
    text.lines()
        .enumerate()
        .filter(|(_, line)| !fence.is_code(line))
        .filter_map(|(idx, line)| parse_task_line(path, idx, line, statuses))
        .collect()
}

/// Parse a single line into a task record. Returns `None` for non-task lines.
pub fn parse_task_line(
    path: &Path,
    line_no: usize,
    line: &str,
    statuses: Option<&StatusConfig>,
) -> Option<TaskRecord> {
    if !is_task_line(line) {
        return None;
    }
    let marker = marker_of(line)?;
    let end = checkbox_end(line)?;
    let body = line[end..].trim_start();

    let description_end = SIGNIFIERS
        .iter()
        .filter_map(|s| body.find(s))
        .min()
        .unwrap_or(body.len());
    let description = body[..description_end].trim().to_string();
    let tail = &body[description_end..];

    Some(TaskRecord {
        id: task_id(path, line),
        description,
        status: status_for_marker(statuses, marker),
        priority: parse_priority(tail),
        tags: parse_tags(body),
        dates: parse_dates(tail),
        location: TaskLocation {
            path: path.to_path_buf(),
            line: line_no,
        },
        original_markdown: line.to_string(),
    })
}

fn parse_priority(tail: &str) -> Priority {
    Priority::RANKED
        .iter()
        .filter_map(|p| p.signifier().and_then(|s| tail.find(s)).map(|pos| (pos, p)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, p)| p.clone())
        .unwrap_or(Priority::None)
}

fn parse_dates(tail: &str) -> TaskDates {
    let mut dates = TaskDates::default();
    for caps in DATE_FIELD.captures_iter(tail) {
        let Ok(date) = NaiveDate::parse_from_str(&caps[2], "%Y-%m-%d") else {
            continue;
        };
        let slot = match &caps[1] {
            "➕" => &mut dates.created,
            "🛫" => &mut dates.start,
            "⏳" => &mut dates.scheduled,
            "📅" => &mut dates.due,
            "✅" => &mut dates.done,
            _ => &mut dates.cancelled,
        };
        slot.get_or_insert(date);
    }
    dates
}

/// Tags in order of appearance, without `#`, deduplicated
fn parse_tags(body: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for caps in TAG.captures_iter(body) {
        let tag = caps[1].to_string();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}
