use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use journeylytics_core::config::Config;
use journeylytics_core::event::EventTable;
use journeylytics_engine::MemoryBackend;
use journeylytics_server::app::build_app;
use journeylytics_server::state::AppState;

async fn json_body(response: axum::http::Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse JSON")
}

// ============================================================
// BDD: Health check reports status, version and loaded events
// ============================================================
#[tokio::test]
async fn test_health_returns_200_with_event_count() {
    let state = Arc::new(AppState::new(
        MemoryBackend::new(EventTable::default()),
        Config::default(),
    ));
    let app = build_app(state);

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build request");

    let response = app.oneshot(request).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["events"], 0);
}

#[tokio::test]
async fn test_unknown_route_returns_not_found_envelope() {
    let state = Arc::new(AppState::new(
        MemoryBackend::new(EventTable::default()),
        Config::default(),
    ));
    let app = build_app(state);

    let request = Request::builder()
        .method("GET")
        .uri("/api/retention")
        .body(Body::empty())
        .expect("build request");

    let response = app.oneshot(request).await.expect("request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "not_found");
}
