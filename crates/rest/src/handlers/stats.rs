//! Backend status handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use searchgate_engine::HealthStatus;
use tracing::debug;

use crate::error::RestResult;
use crate::state::AppState;

/// Probes the backend and reports a coarse status with a light summary.
///
/// # HTTP Request
///
/// `GET [base]/api/v1/ping`
///
/// # Response
///
/// Always `200 OK`; unreachability is a reported status, not an HTTP error,
/// so monitoring can distinguish "gateway down" from "backend down".
pub async fn ping_handler(State(state): State<AppState>) -> RestResult<Response> {
    debug!("processing ping request");

    let status = state.engine().ping().await;
    let doc_count = match status {
        HealthStatus::Unreachable => None,
        _ => state.engine().stats().await.ok().map(|s| s.doc_count),
    };

    let body = serde_json::json!({
        "status": status,
        "engine": state.engine().name(),
        "doc_count": doc_count,
    });

    Ok((StatusCode::OK, Json(body)).into_response())
}

/// Returns full index statistics.
///
/// # HTTP Request
///
/// `GET [base]/api/v1/stats`
///
/// # Response
///
/// - `200 OK` with an `IndexStats` body
/// - `503 Service Unavailable` when the backend cannot be reached
pub async fn stats_handler(State(state): State<AppState>) -> RestResult<Response> {
    debug!("processing stats request");

    let stats = state.engine().stats().await?;

    Ok((StatusCode::OK, Json(stats)).into_response())
}
