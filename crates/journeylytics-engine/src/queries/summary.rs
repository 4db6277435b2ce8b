use journeylytics_core::analytics::{ConversionSummary, FunnelDefinition, StageCount};
use journeylytics_core::event::EventTable;

use super::guarded_pct;
use super::stage_sets::{stage_user_sets, stage_users};

/// Share of acquired users that converted.
///
/// Reported as `0.0` when nobody was acquired, not as a guarded ratio.
pub fn conversion_summary(
    table: &EventTable,
    acquired_stage: &str,
    converted_stage: &str,
) -> ConversionSummary {
    let acquired = stage_users(table, acquired_stage).len();
    let converted = stage_users(table, converted_stage).len();
    let conversion_rate = if acquired == 0 {
        0.0
    } else {
        guarded_pct(converted, acquired)
    };

    ConversionSummary {
        acquired: acquired as i64,
        converted: converted as i64,
        conversion_rate,
    }
}

/// Unique users per funnel stage, in funnel order.
pub fn stage_counts(table: &EventTable, funnel: &FunnelDefinition) -> Vec<StageCount> {
    funnel
        .stages()
        .iter()
        .zip(stage_user_sets(table, funnel.stages()))
        .map(|(stage, users)| StageCount {
            stage: stage.clone(),
            users: users.len() as i64,
        })
        .collect()
}
