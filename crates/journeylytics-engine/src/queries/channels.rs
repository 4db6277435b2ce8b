use std::collections::{HashMap, HashSet};

use journeylytics_core::analytics::{ChannelRow, FunnelDefinition, StageChannelWinner};
use journeylytics_core::event::EventTable;

/// Unique users per channel among events at `stage`.
///
/// Sorted by `unique_users` descending, ties by channel label ascending. A
/// user who reached the stage through two channels counts once under each,
/// so the column can sum to more than the stage's unique-user count.
pub fn channel_breakdown(table: &EventTable, stage: &str) -> Vec<ChannelRow> {
    let mut by_channel: HashMap<&str, HashSet<&str>> = HashMap::new();
    for event in table.at_stage(stage) {
        by_channel
            .entry(event.channel.as_str())
            .or_default()
            .insert(event.user_id.as_str());
    }

    let mut rows = by_channel
        .into_iter()
        .map(|(channel, users)| ChannelRow {
            channel: channel.to_string(),
            unique_users: users.len() as i64,
        })
        .collect::<Vec<_>>();

    rows.sort_by(|a, b| {
        b.unique_users
            .cmp(&a.unique_users)
            .then_with(|| a.channel.cmp(&b.channel))
    });
    rows
}

/// Leading channel for each funnel stage. Stages without events are skipped.
pub fn top_channels(table: &EventTable, funnel: &FunnelDefinition) -> Vec<StageChannelWinner> {
    funnel
        .stages()
        .iter()
        .filter_map(|stage| {
            channel_breakdown(table, stage)
                .into_iter()
                .next()
                .map(|row| StageChannelWinner {
                    stage: stage.clone(),
                    channel: row.channel,
                    unique_users: row.unique_users,
                })
        })
        .collect()
}
