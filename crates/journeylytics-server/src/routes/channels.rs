use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{error::AppError, routes::funnel::resolve_funnel, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ChannelsQuery {
    pub stage: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TopChannelsQuery {
    pub stages: Option<String>,
}

/// `GET /api/channels`: unique users per channel at one stage.
///
/// Defaults to the funnel's base stage. An unknown stage returns an empty
/// list, which clients should render as "no data".
#[tracing::instrument(skip(state))]
pub async fn get_channels(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChannelsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let stage = match query.stage.as_deref().map(str::trim) {
        Some("") => return Err(AppError::BadRequest("stage must not be empty".to_string())),
        Some(s) => s.to_string(),
        None => state.config.funnel.base_stage().to_string(),
    };

    let rows = state.analytics.get_channel_breakdown(&stage);
    Ok(Json(json!({ "data": { "stage": stage, "rows": rows } })))
}

/// `GET /api/channels/top`: leading channel per funnel stage.
#[tracing::instrument(skip(state))]
pub async fn get_top_channels(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TopChannelsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let funnel = resolve_funnel(&state, query.stages.as_deref())?;
    let winners = state.analytics.get_top_channels(&funnel);
    Ok(Json(json!({ "data": winners })))
}
