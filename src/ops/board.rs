//! Turns the evaluator's grouped result into a complete board.
//!
//! Every column the dimension is configured for is present, even when empty,
//! and every swim lane carries the same column sequence.

use std::collections::BTreeMap;

use indexmap::{IndexMap, IndexSet};

use crate::model::board::{Board, Column, GroupField, GroupedResult, GroupingKind, SwimLane};
use crate::model::config::OrderingPolicy;
use crate::model::status::{StatusConfig, StatusType};
use crate::model::task::TaskRecord;
use crate::ops::order::resolve;
use crate::ops::query::QueryError;

/// Column key used when the result is not grouped at all
pub const UNGROUPED_KEY: &str = "Tasks";

/// Build a board from a grouped result. Fails only when the result carries
/// an evaluator error.
pub fn materialize(
    result: &GroupedResult,
    policy: &OrderingPolicy,
    statuses: Option<&StatusConfig>,
) -> Result<Board, QueryError> {
    if let Some(message) = &result.error {
        return Err(QueryError(message.clone()));
    }

    let board = if result.groupers.len() == 2 {
        materialize_lanes(result, policy, statuses)
    } else {
        materialize_columns(result, policy, statuses)
    };
    tracing::debug!(
        groups = result.groups.len(),
        total = result.total,
        columns = board.column_keys().len(),
        "materialized board"
    );
    Ok(board)
}

fn materialize_columns(
    result: &GroupedResult,
    policy: &OrderingPolicy,
    statuses: Option<&StatusConfig>,
) -> Board {
    let field = column_field(result);
    let mut cells: IndexMap<String, Vec<TaskRecord>> = IndexMap::new();
    for group in &result.groups {
        let key = group
            .keys
            .last()
            .map(|raw| key_label(field, raw))
            .unwrap_or_else(|| UNGROUPED_KEY.to_string());
        cells.entry(key).or_default().extend(group.tasks.iter().cloned());
    }

    let keys = column_order(cells.keys(), field, policy, statuses);
    let columns = keys
        .into_iter()
        .map(|key| {
            let tasks = cells.swap_remove(&key).unwrap_or_default();
            Column { key, tasks }
        })
        .collect();
    Board::Columns { columns }
}

fn materialize_lanes(
    result: &GroupedResult,
    policy: &OrderingPolicy,
    statuses: Option<&StatusConfig>,
) -> Board {
    let lane_field = result.groupers.first().copied();
    let field = column_field(result);
    // lane → column → tasks; lanes sort lexicographically
    let mut lanes: BTreeMap<String, IndexMap<String, Vec<TaskRecord>>> = BTreeMap::new();
    let mut observed: IndexSet<String> = IndexSet::new();
    for group in &result.groups {
        let (Some(lane_raw), Some(col_raw)) = (group.keys.first(), group.keys.get(1)) else {
            continue;
        };
        let lane = key_label(lane_field, lane_raw);
        let column = key_label(field, col_raw);
        observed.insert(column.clone());
        lanes
            .entry(lane)
            .or_default()
            .entry(column)
            .or_default()
            .extend(group.tasks.iter().cloned());
    }

    let column_keys = column_order(observed.iter(), field, policy, statuses);
    let lanes = lanes
        .into_iter()
        .map(|(name, mut cells)| SwimLane {
            name,
            columns: column_keys
                .iter()
                .map(|key| Column {
                    key: key.clone(),
                    tasks: cells.swap_remove(key).unwrap_or_default(),
                })
                .collect(),
        })
        .collect();
    Board::Lanes { column_keys, lanes }
}

/// The dimension that forms the board's columns: the inner level of a
/// two-level grouping, otherwise the innermost level.
pub fn column_field(result: &GroupedResult) -> Option<GroupField> {
    if result.groupers.len() == 2 {
        result.groupers.get(1).copied()
    } else {
        result.groupers.last().copied()
    }
}

/// Only status-type keys carry internal ids; every other key is user data.
fn key_label(field: Option<GroupField>, raw: &str) -> String {
    match field {
        Some(GroupField::Status) => display_key(raw),
        _ => raw.to_string(),
    }
}

/// Configured keys plus the observed ones, ordered for the dimension.
/// Configured keys come first so they win rank ties.
fn column_order<'k>(
    observed: impl Iterator<Item = &'k String>,
    field: Option<GroupField>,
    policy: &OrderingPolicy,
    statuses: Option<&StatusConfig>,
) -> Vec<String> {
    let (mut available, kind): (IndexSet<String>, _) = match field {
        Some(field) => (
            field.configured_keys(statuses).into_iter().collect(),
            field.kind(),
        ),
        None => (IndexSet::new(), GroupingKind::Lexical),
    };
    available.extend(observed.cloned());
    resolve(&available, policy, kind, statuses)
}

/// Resolve an internal group identifier to its display name.
///
/// Status categories arrive as `CODE` or `CODE#<digits>` (`IN_PROGRESS#2`);
/// anything without a mapping is returned unchanged.
pub fn display_key(raw: &str) -> String {
    if let Some(kind) = StatusType::ALL.into_iter().find(|t| t.code() == raw) {
        return kind.label().to_string();
    }
    if let Some((prefix, suffix)) = raw.rsplit_once('#')
        && !suffix.is_empty()
        && suffix.chars().all(|c| c.is_ascii_digit())
        && let Some(kind) = StatusType::ALL.into_iter().find(|t| t.code() == prefix)
    {
        return kind.label().to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::board::TaskGroup;
    use crate::parse::parse_task_line;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn task(line: &str) -> TaskRecord {
        parse_task_line(Path::new("Notes.md"), 0, line, None).unwrap()
    }

    fn group(keys: &[&str], tasks: Vec<TaskRecord>) -> TaskGroup {
        TaskGroup {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            tasks,
        }
    }

    fn shape(board: &Board) -> Vec<(String, usize)> {
        match board {
            Board::Columns { columns } => columns
                .iter()
                .map(|c| (c.key.clone(), c.tasks.len()))
                .collect(),
            Board::Lanes { .. } => panic!("expected columns"),
        }
    }

    #[test]
    fn test_default_status_board_is_complete() {
        let result = GroupedResult {
            groupers: vec![GroupField::Status],
            groups: vec![
                group(&["Todo"], vec![task("- [ ] A")]),
                group(&["Done"], vec![]),
            ],
            total: 1,
            error: None,
        };
        let board = materialize(&result, &OrderingPolicy::default(), None).unwrap();
        assert_eq!(
            shape(&board),
            vec![
                ("Todo".to_string(), 1),
                ("In-Progress".to_string(), 0),
                ("Done".to_string(), 0),
                ("Cancelled".to_string(), 0),
            ]
        );
        match &board {
            Board::Columns { columns } => assert_eq!(columns[0].tasks[0].description, "A"),
            Board::Lanes { .. } => unreachable!(),
        }
    }

    #[test]
    fn test_internal_ids_become_display_names() {
        let result = GroupedResult {
            groupers: vec![GroupField::Status],
            groups: vec![
                group(&["IN_PROGRESS#1"], vec![task("- [/] B")]),
                group(&["NON_TASK#4"], vec![task("- [ ] C")]),
            ],
            total: 2,
            error: None,
        };
        let board = materialize(&result, &OrderingPolicy::default(), None).unwrap();
        assert_eq!(
            board.column_keys(),
            vec!["Todo", "In-Progress", "Done", "Cancelled", "Non-Task"]
        );
    }

    #[test]
    fn test_display_key() {
        assert_eq!(display_key("TODO"), "Todo");
        assert_eq!(display_key("CANCELLED#3"), "Cancelled");
        assert_eq!(display_key("TODO#x"), "TODO#x");
        assert_eq!(display_key("TODO#"), "TODO#");
        assert_eq!(display_key("#errand"), "#errand");
        assert_eq!(display_key("projects/site"), "projects/site");
    }

    #[test]
    fn test_lexical_keys_are_not_internal_ids() {
        let result = GroupedResult {
            groupers: vec![GroupField::Filename],
            groups: vec![
                group(&["TODO"], vec![task("- [ ] A")]),
                group(&["DONE"], vec![task("- [ ] B")]),
            ],
            total: 2,
            error: None,
        };
        let board = materialize(&result, &OrderingPolicy::default(), None).unwrap();
        assert_eq!(board.column_keys(), vec!["DONE", "TODO"]);
    }

    #[test]
    fn test_lane_names_are_not_internal_ids() {
        let result = GroupedResult {
            groupers: vec![GroupField::Folder, GroupField::Status],
            groups: vec![
                group(&["DONE", "TODO#0"], vec![task("- [ ] A")]),
                group(&["work", "DONE#2"], vec![task("- [x] B")]),
            ],
            total: 2,
            error: None,
        };
        let board = materialize(&result, &OrderingPolicy::default(), None).unwrap();
        let Board::Lanes { lanes, .. } = &board else {
            panic!("expected lanes");
        };
        let names: Vec<&str> = lanes.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["DONE", "work"]);
        assert_eq!(lanes[0].column("Todo").unwrap().tasks.len(), 1);
    }

    #[test]
    fn test_column_field() {
        let mut result = GroupedResult {
            groupers: vec![GroupField::Folder, GroupField::StatusName],
            ..Default::default()
        };
        assert_eq!(column_field(&result), Some(GroupField::StatusName));
        result.groupers = vec![GroupField::Status];
        assert_eq!(column_field(&result), Some(GroupField::Status));
        result.groupers.clear();
        assert_eq!(column_field(&result), None);
    }

    #[test]
    fn test_user_order_applies_to_columns() {
        let result = GroupedResult {
            groupers: vec![GroupField::Status],
            groups: vec![group(&["Todo"], vec![task("- [ ] A")])],
            total: 1,
            error: None,
        };
        let policy = OrderingPolicy::new(vec!["Done".into(), "Todo".into()]);
        let board = materialize(&result, &policy, None).unwrap();
        assert_eq!(
            board.column_keys(),
            vec!["Done", "Todo", "In-Progress", "Cancelled"]
        );
    }

    #[test]
    fn test_lexical_columns_have_no_extras() {
        let result = GroupedResult {
            groupers: vec![GroupField::Folder],
            groups: vec![
                group(&["projects"], vec![task("- [ ] A")]),
                group(&["/"], vec![task("- [ ] B"), task("- [ ] C")]),
            ],
            total: 3,
            error: None,
        };
        let board = materialize(&result, &OrderingPolicy::default(), None).unwrap();
        assert_eq!(
            shape(&board),
            vec![("/".to_string(), 2), ("projects".to_string(), 1)]
        );
    }

    #[test]
    fn test_priority_columns_complete() {
        let result = GroupedResult {
            groupers: vec![GroupField::Priority],
            groups: vec![group(&["Urgent"], vec![task("- [ ] A")])],
            total: 1,
            error: None,
        };
        let board = materialize(&result, &OrderingPolicy::default(), None).unwrap();
        assert_eq!(
            board.column_keys(),
            vec!["Highest", "High", "Medium", "Low", "Lowest", "None", "Urgent"]
        );
    }

    #[test]
    fn test_same_key_groups_merge() {
        let result = GroupedResult {
            groupers: vec![GroupField::Status],
            groups: vec![
                group(&["TODO#0"], vec![task("- [ ] A")]),
                group(&["Todo"], vec![task("- [ ] B")]),
            ],
            total: 2,
            error: None,
        };
        let board = materialize(&result, &OrderingPolicy::default(), None).unwrap();
        assert_eq!(shape(&board)[0], ("Todo".to_string(), 2));
    }

    #[test]
    fn test_ungrouped_result_single_column() {
        let result = GroupedResult {
            groupers: vec![],
            groups: vec![group(&[], vec![task("- [ ] A")])],
            total: 1,
            error: None,
        };
        let board = materialize(&result, &OrderingPolicy::default(), None).unwrap();
        assert_eq!(shape(&board), vec![(UNGROUPED_KEY.to_string(), 1)]);
    }

    #[test]
    fn test_query_error_is_surfaced() {
        let result = GroupedResult::failed("unknown group field 'mood'");
        let err = materialize(&result, &OrderingPolicy::default(), None).unwrap_err();
        assert_eq!(err.to_string(), "unknown group field 'mood'");
    }

    #[test]
    fn test_lanes_share_column_keys() {
        let result = GroupedResult {
            groupers: vec![GroupField::Folder, GroupField::Status],
            groups: vec![
                group(&["work", "TODO#0"], vec![task("- [ ] A")]),
                group(&["home", "DONE#2"], vec![task("- [x] B")]),
                group(&["home", "Waiting"], vec![task("- [?] C")]),
                group(&["errands", "IN_PROGRESS#1"], vec![]),
            ],
            total: 3,
            error: None,
        };
        let board = materialize(&result, &OrderingPolicy::default(), None).unwrap();
        let Board::Lanes { column_keys, lanes } = &board else {
            panic!("expected lanes");
        };
        assert_eq!(
            column_keys,
            &vec!["Todo", "In-Progress", "Done", "Cancelled", "Waiting"]
        );
        let names: Vec<&str> = lanes.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["errands", "home", "work"]);
        for lane in lanes {
            let keys: Vec<&String> = lane.columns.iter().map(|c| &c.key).collect();
            assert_eq!(keys, column_keys.iter().collect::<Vec<_>>());
        }
        assert_eq!(lanes[1].column("Waiting").unwrap().tasks.len(), 1);
        assert_eq!(lanes[2].column("Todo").unwrap().tasks.len(), 1);
        assert!(lanes[0].columns.iter().all(|c| c.tasks.is_empty()));
    }

    #[test]
    fn test_materialize_is_pure() {
        let result = GroupedResult {
            groupers: vec![GroupField::Tag, GroupField::Priority],
            groups: vec![
                group(&["#b", "High"], vec![task("- [ ] A ⏫ #b")]),
                group(&["#a", "Low"], vec![task("- [ ] B 🔽 #a")]),
            ],
            total: 2,
            error: None,
        };
        let policy = OrderingPolicy::default();
        let first = materialize(&result, &policy, None).unwrap();
        let second = materialize(&result, &policy, None).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.tasks().len(), 2);
    }
}
