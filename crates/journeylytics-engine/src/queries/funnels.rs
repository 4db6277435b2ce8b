use journeylytics_core::analytics::{FunnelDefinition, FunnelReport, FunnelStageRow};
use journeylytics_core::event::EventTable;

use super::guarded_pct;
use super::stage_sets::stage_user_sets;

/// Per-stage unique users and conversion ratios, in funnel order.
///
/// The first stage always reports `conv_from_prev_% = 100.0`, even with zero
/// users. Later stages divide by `max(1, previous count)`; every stage divides
/// by `max(1, base count)` for `conv_from_base_%`.
pub fn funnel_summary(table: &EventTable, funnel: &FunnelDefinition) -> Vec<FunnelStageRow> {
    let sets = stage_user_sets(table, funnel.stages());
    let base = sets.first().map(|s| s.len()).unwrap_or(0);

    let mut rows = Vec::with_capacity(sets.len());
    let mut prev_count = base;
    for (idx, (stage, users)) in funnel.stages().iter().zip(&sets).enumerate() {
        let count = users.len();
        let conv_from_prev = if idx == 0 {
            100.0
        } else {
            guarded_pct(count, prev_count)
        };
        rows.push(FunnelStageRow {
            stage: stage.clone(),
            users: count as i64,
            conv_from_prev,
            conv_from_base: guarded_pct(count, base),
        });
        prev_count = count;
    }
    rows
}

/// [`funnel_summary`] plus the headline numbers shown above the table.
pub fn get_funnel_inner(table: &EventTable, funnel: &FunnelDefinition) -> FunnelReport {
    let stages = funnel_summary(table, funnel);
    let total_entered = stages.first().map(|r| r.users).unwrap_or(0);
    let final_conversion_rate = stages.last().map(|r| r.conv_from_base).unwrap_or(0.0);

    tracing::debug!(
        stages = stages.len(),
        total_entered,
        final_conversion_rate,
        "Computed funnel"
    );

    FunnelReport {
        stages,
        total_entered,
        final_conversion_rate,
    }
}
