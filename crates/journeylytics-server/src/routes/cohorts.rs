use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use journeylytics_core::analytics::{
    AcquisitionPolicy, CohortGranularity, CohortQuery, ConversionMode,
};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CohortsQuery {
    pub granularity: Option<String>,
    pub policy: Option<String>,
    pub conversion: Option<String>,
}

fn build_cohort_query(state: &AppState, query: &CohortsQuery) -> Result<CohortQuery, AppError> {
    let mut cohort_query = state.config.cohort_query();

    if let Some(raw) = query.granularity.as_deref() {
        cohort_query.granularity = CohortGranularity::parse(Some(raw))
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
    }
    if let Some(raw) = query.policy.as_deref() {
        cohort_query.acquisition_policy = AcquisitionPolicy::parse(Some(raw))
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
    }
    if let Some(raw) = query.conversion.as_deref() {
        cohort_query.conversion_mode = ConversionMode::parse(Some(raw))
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
    }

    Ok(cohort_query)
}

/// `GET /api/cohorts`: converted percentage by acquisition period.
///
/// Rows are ordered oldest period first, ready for a line chart.
#[tracing::instrument(skip(state))]
pub async fn get_cohorts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CohortsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let cohort_query = build_cohort_query(&state, &query)?;
    let data = state.analytics.get_cohorts(&cohort_query)?;
    Ok(Json(json!({ "data": data })))
}
