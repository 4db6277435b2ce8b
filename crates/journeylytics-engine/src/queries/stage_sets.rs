use std::collections::{HashMap, HashSet};

use journeylytics_core::event::EventTable;

/// Distinct user ids with at least one event whose stage equals `stage`.
///
/// Exact, case-sensitive match. An unknown stage yields an empty set.
pub fn stage_users<'a>(table: &'a EventTable, stage: &str) -> HashSet<&'a str> {
    table
        .records()
        .iter()
        .filter(|e| e.stage == stage)
        .map(|e| e.user_id.as_str())
        .collect()
}

/// User sets for every stage in `stages`, built in one pass over the table.
///
/// The result is aligned with `stages`; a stage listed twice gets the same set
/// twice.
pub fn stage_user_sets<'a>(table: &'a EventTable, stages: &[String]) -> Vec<HashSet<&'a str>> {
    let mut by_stage: HashMap<&str, HashSet<&'a str>> = stages
        .iter()
        .map(|s| (s.as_str(), HashSet::new()))
        .collect();

    for event in table.records() {
        if let Some(users) = by_stage.get_mut(event.stage.as_str()) {
            users.insert(event.user_id.as_str());
        }
    }

    stages
        .iter()
        .map(|s| by_stage.get(s.as_str()).cloned().unwrap_or_default())
        .collect()
}
