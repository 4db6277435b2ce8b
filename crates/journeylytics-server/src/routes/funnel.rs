use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use journeylytics_core::analytics::FunnelDefinition;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct FunnelQuery {
    /// Comma-separated stage list overriding the configured funnel.
    pub stages: Option<String>,
}

/// Funnel from the `stages` parameter, or the configured one when absent.
/// A present but blank list is rejected.
pub(crate) fn resolve_funnel(
    state: &AppState,
    stages: Option<&str>,
) -> Result<FunnelDefinition, AppError> {
    match stages {
        Some(raw) => FunnelDefinition::parse(raw)
            .map_err(|_| AppError::BadRequest("stages must name at least one stage".to_string())),
        None => Ok(state.config.funnel.clone()),
    }
}

/// `GET /api/funnel`: per-stage unique users and conversion ratios.
#[tracing::instrument(skip(state))]
pub async fn get_funnel(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FunnelQuery>,
) -> Result<impl IntoResponse, AppError> {
    let funnel = resolve_funnel(&state, query.stages.as_deref())?;
    let report = state.analytics.get_funnel(&funnel);
    Ok(Json(json!({ "data": report })))
}
