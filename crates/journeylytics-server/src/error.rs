use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use journeylytics_core::error::CoreError;
use journeylytics_engine::LoadError;

/// Application-level errors that map directly to HTTP responses.
///
/// Every variant implements [`IntoResponse`] so Axum handlers can use
/// `Result<impl IntoResponse, AppError>` as their return type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    /// The event data itself is unusable (missing column, bad date,
    /// conflicting acquisitions).
    #[error("invalid input: {message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
    },

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<CoreError> for AppError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::EmptyFunnel => AppError::BadRequest(e.to_string()),
            other => AppError::InvalidInput {
                field: other.field().map(str::to_string),
                message: other.to_string(),
            },
        }
    }
}

impl From<LoadError> for AppError {
    fn from(e: LoadError) -> Self {
        match e {
            LoadError::Io { .. } => AppError::Internal(anyhow::anyhow!(e)),
            LoadError::Csv(_) => AppError::InvalidInput {
                message: e.to_string(),
                field: None,
            },
            LoadError::Row { ref source, .. } => AppError::InvalidInput {
                field: source.field().map(str::to_string),
                message: e.to_string(),
            },
            LoadError::Core(core) => core.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, field) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                msg.clone(),
                None,
            ),
            AppError::InvalidInput { message, field } => (
                StatusCode::BAD_REQUEST,
                "invalid_input",
                message.clone(),
                field.clone(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        (
            status,
            Json(json!({
                "error": {
                    "code": code,
                    "message": message,
                    "field": field
                }
            })),
        )
            .into_response()
    }
}
