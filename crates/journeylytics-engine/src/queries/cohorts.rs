use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{NaiveDate, NaiveDateTime};

use journeylytics_core::analytics::{
    AcquisitionPolicy, CohortGranularity, CohortQuery, CohortResponse, CohortRow, ConversionMode,
};
use journeylytics_core::error::CoreError;
use journeylytics_core::event::EventTable;

use super::round_one_decimal;

/// One cohort membership: the period a user was acquired in and the
/// acquisition timestamp that placed them there.
#[derive(Debug, Clone, Copy)]
struct Membership {
    period_start: NaiveDate,
    acquired_at: NaiveDateTime,
}

#[derive(Debug, Default)]
struct CohortCell {
    size: i64,
    converted: i64,
}

fn resolve_memberships(
    user_id: &str,
    acquisitions: &[NaiveDateTime],
    granularity: &CohortGranularity,
    policy: &AcquisitionPolicy,
) -> Result<Vec<Membership>, CoreError> {
    let membership = |at: NaiveDateTime| Membership {
        period_start: granularity.truncate(at.date()),
        acquired_at: at,
    };

    match policy {
        AcquisitionPolicy::Earliest => Ok(acquisitions
            .iter()
            .min()
            .map(|at| vec![membership(*at)])
            .unwrap_or_default()),
        AcquisitionPolicy::Latest => Ok(acquisitions
            .iter()
            .max()
            .map(|at| vec![membership(*at)])
            .unwrap_or_default()),
        AcquisitionPolicy::EachPeriod | AcquisitionPolicy::Reject => {
            // Earliest acquisition inside each distinct period.
            let mut per_period: BTreeMap<NaiveDate, NaiveDateTime> = BTreeMap::new();
            for at in acquisitions {
                let start = granularity.truncate(at.date());
                per_period
                    .entry(start)
                    .and_modify(|existing| {
                        if *at < *existing {
                            *existing = *at;
                        }
                    })
                    .or_insert(*at);
            }

            if matches!(policy, AcquisitionPolicy::Reject) && per_period.len() > 1 {
                return Err(CoreError::ConflictingAcquisition {
                    user_id: user_id.to_string(),
                    periods: per_period.keys().map(|d| granularity.label(*d)).collect(),
                });
            }

            Ok(per_period
                .into_iter()
                .map(|(period_start, acquired_at)| Membership {
                    period_start,
                    acquired_at,
                })
                .collect())
        }
    }
}

fn build_rows(
    grouped: BTreeMap<NaiveDate, CohortCell>,
    granularity: &CohortGranularity,
) -> Vec<CohortRow> {
    grouped
        .into_iter()
        .map(|(period_start, cell)| CohortRow {
            acquisition_period: granularity.label(period_start),
            cohort_size: cell.size,
            converted: cell.converted,
            converted_pct: if cell.size == 0 {
                0.0
            } else {
                round_one_decimal(cell.converted as f64 / cell.size as f64 * 100.0)
            },
        })
        .collect()
}

/// Converted percentage per acquisition period, oldest period first.
///
/// With [`ConversionMode::AnyTime`] a converted event counts regardless of
/// its date, including one dated before acquisition. Only
/// [`AcquisitionPolicy::Reject`] can fail.
pub fn cohort_conversion(
    table: &EventTable,
    query: &CohortQuery,
) -> Result<Vec<CohortRow>, CoreError> {
    let mut acquisitions: BTreeMap<&str, Vec<NaiveDateTime>> = BTreeMap::new();
    for event in table.at_stage(&query.acquired_stage) {
        acquisitions
            .entry(event.user_id.as_str())
            .or_default()
            .push(event.event_date);
    }

    // Latest conversion per user: a strict match only needs one conversion at
    // or after acquisition, and the latest is the best candidate.
    let mut latest_conversion: HashMap<&str, NaiveDateTime> = HashMap::new();
    for event in table.at_stage(&query.converted_stage) {
        latest_conversion
            .entry(event.user_id.as_str())
            .and_modify(|existing| {
                if event.event_date > *existing {
                    *existing = event.event_date;
                }
            })
            .or_insert(event.event_date);
    }

    let mut grouped: BTreeMap<NaiveDate, CohortCell> = BTreeMap::new();
    let mut multi_period_users = BTreeSet::new();
    for (user_id, dates) in &acquisitions {
        let memberships =
            resolve_memberships(user_id, dates, &query.granularity, &query.acquisition_policy)?;
        if memberships.len() > 1 {
            multi_period_users.insert(*user_id);
        }

        for m in memberships {
            let converted = match (&query.conversion_mode, latest_conversion.get(user_id)) {
                (_, None) => false,
                (ConversionMode::AnyTime, Some(_)) => true,
                (ConversionMode::OnOrAfterAcquisition, Some(at)) => *at >= m.acquired_at,
            };
            let cell = grouped.entry(m.period_start).or_default();
            cell.size += 1;
            if converted {
                cell.converted += 1;
            }
        }
    }

    if !multi_period_users.is_empty() {
        tracing::debug!(
            users = multi_period_users.len(),
            "Users counted in more than one acquisition period"
        );
    }

    Ok(build_rows(grouped, &query.granularity))
}

pub fn get_cohorts_inner(
    table: &EventTable,
    query: &CohortQuery,
) -> Result<CohortResponse, CoreError> {
    let rows = cohort_conversion(table, query)?;
    tracing::debug!(
        cohorts = rows.len(),
        granularity = ?query.granularity,
        policy = ?query.acquisition_policy,
        "Computed cohort conversion"
    );
    Ok(CohortResponse {
        granularity: query.granularity.clone(),
        acquisition_policy: query.acquisition_policy.clone(),
        conversion_mode: query.conversion_mode.clone(),
        rows,
    })
}
