use std::sync::Arc;

use axum::{
    http::{HeaderValue, Uri},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, routes, state::AppState};

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %o, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if parsed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(parsed))
    }
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {uri}"))
}

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// Middleware, outermost first (the layer added last wraps the others):
///
/// 1. `CorsLayer` for dashboards served from another origin.
///    `JOURNEYLYTICS_CORS_ORIGINS` narrows it; empty allows any origin.
/// 2. `TraceLayer`: structured request/response logging via `tracing`.
pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/funnel", get(routes::funnel::get_funnel))
        .route("/api/channels", get(routes::channels::get_channels))
        .route("/api/channels/top", get(routes::channels::get_top_channels))
        .route("/api/cohorts", get(routes::cohorts::get_cohorts))
        .route("/api/summary", get(routes::summary::get_summary))
        .route("/api/export/funnel.csv", get(routes::export::export_funnel))
        .route("/api/reload", post(routes::reload::reload))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
