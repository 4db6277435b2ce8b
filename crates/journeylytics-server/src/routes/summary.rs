use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::state::AppState;

/// `GET /api/summary`: KPI counts per stage and overall conversion rate.
#[tracing::instrument(skip(state))]
pub async fn get_summary(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cfg = &state.config;
    let kpis = state
        .analytics
        .get_kpis(&cfg.funnel, &cfg.acquired_stage, &cfg.converted_stage);
    Json(json!({ "data": kpis }))
}
