use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use tracing::info;

use crate::{error::AppError, state::AppState};

/// `POST /api/reload`: re-read the event CSV and replace the in-memory table.
///
/// Requests already computing keep the table they started with.
#[tracing::instrument(skip(state))]
pub async fn reload(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let worker_state = Arc::clone(&state);
    let events = tokio::task::spawn_blocking(move || worker_state.reload())
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("reload task failed: {e}")))??;

    info!(events, path = %state.config.data_path, "Event table reloaded");
    Ok(Json(json!({ "data": { "events": events } })))
}
