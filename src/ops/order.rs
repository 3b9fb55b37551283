use indexmap::IndexSet;

use crate::model::board::GroupingKind;
use crate::model::config::OrderingPolicy;
use crate::model::status::{StatusConfig, StatusType};
use crate::model::task::Priority;

/// Order the available keys of one grouping dimension.
///
/// `available` is in discovery order; keys left over after ranking keep that
/// order, so equal inputs always produce equal outputs.
pub fn resolve(
    available: &IndexSet<String>,
    policy: &OrderingPolicy,
    kind: GroupingKind,
    statuses: Option<&StatusConfig>,
) -> Vec<String> {
    match kind {
        GroupingKind::Status if !policy.column_order.is_empty() => {
            user_order(available, &policy.column_order)
        }
        GroupingKind::Status => ranked(available, |key| status_rank(key, statuses)),
        GroupingKind::Priority => ranked(available, |key| Priority::from_label(key).rank()),
        GroupingKind::Lexical => {
            let mut keys: Vec<String> = available.iter().cloned().collect();
            keys.sort();
            keys
        }
    }
}

/// User keys first (skipping absent ones), then the rest in discovery order
fn user_order(available: &IndexSet<String>, order: &[String]) -> Vec<String> {
    let mut placed: IndexSet<&str> = IndexSet::new();
    for key in order {
        if available.contains(key) {
            placed.insert(key);
        }
    }
    for key in available {
        placed.insert(key);
    }
    placed.into_iter().map(str::to_string).collect()
}

/// Ranked keys by rank (ties in discovery order), then unranked leftovers
fn ranked(available: &IndexSet<String>, rank: impl Fn(&str) -> Option<usize>) -> Vec<String> {
    let mut with_rank: Vec<(usize, &String)> = Vec::new();
    let mut leftovers: Vec<&String> = Vec::new();
    for key in available {
        match rank(key) {
            Some(r) => with_rank.push((r, key)),
            None => leftovers.push(key),
        }
    }
    // stable: equal ranks keep discovery order
    with_rank.sort_by_key(|(r, _)| *r);
    with_rank
        .into_iter()
        .map(|(_, k)| k)
        .chain(leftovers)
        .cloned()
        .collect()
}

/// Workflow rank of a status key: a type label or code, or a configured
/// status name (ranked by its type).
fn status_rank(key: &str, statuses: Option<&StatusConfig>) -> Option<usize> {
    if let Some(kind) = StatusType::from_key(key) {
        return Some(kind.rank());
    }
    statuses
        .and_then(|config| config.by_name(key))
        .map(|s| s.kind.rank())
}
