//! Message indexing handler.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use searchgate_engine::Message;
use tracing::debug;

use crate::error::RestResult;
use crate::state::AppState;

/// Indexes one message, replacing any previous version with the same
/// chat/message identity.
///
/// # HTTP Request
///
/// `POST [base]/api/v1/upsert`
///
/// # Response
///
/// - `200 OK` with `{"result": "ok"}`
/// - `400 Bad Request` for malformed bodies
/// - `503 Service Unavailable` when the backend is down
pub async fn upsert_handler(
    State(state): State<AppState>,
    Json(message): Json<Message>,
) -> RestResult<Response> {
    debug!(
        chat_id = message.chat.id,
        message_id = message.message_id,
        "processing upsert request"
    );

    state.engine().upsert(&message).await?;

    Ok((StatusCode::OK, Json(serde_json::json!({ "result": "ok" }))).into_response())
}
