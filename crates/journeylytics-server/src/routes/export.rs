use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::Response,
};

use journeylytics_core::analytics::FunnelStageRow;

use crate::{
    error::AppError,
    routes::funnel::{resolve_funnel, FunnelQuery},
    state::AppState,
};

/// `GET /api/export/funnel.csv`: download the funnel table as CSV.
///
/// Accepts the same `stages` override as `GET /api/funnel`.
#[tracing::instrument(skip(state))]
pub async fn export_funnel(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FunnelQuery>,
) -> Result<Response, AppError> {
    let funnel = resolve_funnel(&state, query.stages.as_deref())?;
    let report = state.analytics.get_funnel(&funnel);

    let csv_bytes = Bytes::from(build_csv(&report.stages).map_err(AppError::Internal)?);
    build_csv_response("funnel.csv", csv_bytes)
}

/// Sanitize a CSV field value against formula injection.
///
/// Spreadsheet apps interpret values that begin with `=`, `+`, `-`, `@`, TAB,
/// or CR as formula expressions. Prepending a single quote (`'`) causes them
/// to treat the value as a literal string.
fn sanitize_csv_field(val: &str) -> std::borrow::Cow<'_, str> {
    if val.starts_with(['=', '+', '-', '@', '\t', '\r']) {
        std::borrow::Cow::Owned(format!("'{val}"))
    } else {
        std::borrow::Cow::Borrowed(val)
    }
}

fn build_csv(rows: &[FunnelStageRow]) -> anyhow::Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::with_capacity(rows.len().saturating_mul(64)));

    wtr.write_record(["stage", "users", "conv_from_prev_%", "conv_from_base_%"])
        .map_err(|e| anyhow::anyhow!("csv write_record failed: {e}"))?;

    for row in rows {
        let stage = sanitize_csv_field(&row.stage);
        let users = row.users.to_string();
        let conv_from_prev = format!("{:.1}", row.conv_from_prev);
        let conv_from_base = format!("{:.1}", row.conv_from_base);
        wtr.write_record([
            stage.as_ref(),
            users.as_str(),
            conv_from_prev.as_str(),
            conv_from_base.as_str(),
        ])
        .map_err(|e| anyhow::anyhow!("csv write_record failed: {e}"))?;
    }

    wtr.into_inner()
        .map_err(|e| anyhow::anyhow!("csv flush failed: {e}"))
}

fn build_csv_response(filename: &str, csv_bytes: Bytes) -> Result<Response, AppError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(axum::body::Body::from(csv_bytes))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("response build failed: {e}")))
}
