//! Health check endpoint handler.
//!
//! Process liveness only. Deliberately unauthenticated and independent of
//! the backend: a dead Elasticsearch must not make load balancers recycle
//! the gateway itself. Backend health lives at `/api/v1/ping`.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::error::RestResult;
use crate::state::AppState;

/// Handler for the health check endpoint.
///
/// # HTTP Request
///
/// `GET [base]/health`
pub async fn health_handler(State(state): State<AppState>) -> RestResult<Response> {
    debug!("processing health check request");

    let body = serde_json::json!({
        "status": "healthy",
        "engine": state.engine().name(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok((StatusCode::OK, Json(body)).into_response())
}
