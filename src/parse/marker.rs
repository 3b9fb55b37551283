use std::sync::LazyLock;

use regex::Regex;

/// A list item followed by a one-character bracketed status marker:
/// `- [ ]`, `* [x]`, `1. [/]`, `> - [-]`.
static CHECKBOX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[ \t]*>)*[ \t]*(?:[-*+]|[0-9]+[.)])[ \t]+\[(?P<marker>[^\]])\]")
        .expect("checkbox pattern is valid")
});

/// Result of rewriting the marker of one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite<'a> {
    /// The marker was replaced
    Changed(String),
    /// The line already carries the requested marker
    Unchanged(&'a str),
    /// The line is not a checkbox task; returned as-is
    Malformed(&'a str),
}

impl Rewrite<'_> {
    /// The resulting line text, whatever the outcome
    pub fn as_str(&self) -> &str {
        match self {
            Rewrite::Changed(s) => s,
            Rewrite::Unchanged(s) | Rewrite::Malformed(s) => s,
        }
    }
}

/// True if the line starts with a checkbox task. The checkbox must be
/// followed by a blank or the end of the line: `- [x]Done` is not a task.
pub fn is_task_line(line: &str) -> bool {
    checkbox_end(line).is_some_and(|end| {
        let rest = &line[end..];
        rest.is_empty() || rest.starts_with([' ', '\t'])
    })
}

/// The status marker of a checkbox line
pub fn marker_of(line: &str) -> Option<&str> {
    CHECKBOX
        .captures(line)
        .and_then(|caps| caps.name("marker"))
        .map(|m| m.as_str())
}

/// Byte offset just past the closing `]` of the checkbox
pub(crate) fn checkbox_end(line: &str) -> Option<usize> {
    CHECKBOX.find(line).map(|m| m.end())
}

/// Replace the bracketed marker of `line` with `marker`, leaving every other
/// byte untouched.
pub fn rewrite_marker(line: &str, marker: char) -> Rewrite<'_> {
    let Some(found) = CHECKBOX.captures(line).and_then(|caps| caps.name("marker")) else {
        return Rewrite::Malformed(line);
    };
    let mut buf = [0u8; 4];
    let replacement: &str = marker.encode_utf8(&mut buf);
    if found.as_str() == replacement {
        return Rewrite::Unchanged(line);
    }
    let mut out = String::with_capacity(line.len() + replacement.len());
    out.push_str(&line[..found.start()]);
    out.push_str(replacement);
    out.push_str(&line[found.end()..]);
    Rewrite::Changed(out)
}
