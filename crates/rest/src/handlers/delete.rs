//! Deletion handlers: by chat, by user, and full clear.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{RestError, RestResult};
use crate::state::AppState;

/// Query parameters for chat-scoped deletion.
#[derive(Debug, Deserialize)]
pub struct DeleteMessagesParams {
    /// The chat whose messages are removed.
    pub chat_id: Option<i64>,
}

/// Query parameters for the clear operation.
#[derive(Debug, Deserialize)]
pub struct ClearParams {
    /// Must be `true`; clearing the whole index is irreversible.
    #[serde(default)]
    pub confirm: bool,
}

/// Deletes every message of one chat.
///
/// # HTTP Request
///
/// `DELETE [base]/api/v1/messages?chat_id=X`
///
/// # Response
///
/// - `200 OK` with `{"deleted": n}`
/// - `400 Bad Request` when `chat_id` is missing
pub async fn delete_messages_handler(
    State(state): State<AppState>,
    Query(params): Query<DeleteMessagesParams>,
) -> RestResult<Response> {
    let chat_id = params
        .chat_id
        .ok_or_else(|| RestError::bad_request("chat_id query parameter is required"))?;

    debug!(chat_id, "processing delete-by-chat request");
    let deleted = state.engine().delete_by_chat(chat_id).await?;

    Ok((StatusCode::OK, Json(serde_json::json!({ "deleted": deleted }))).into_response())
}

/// Deletes every message sent by one user.
///
/// # HTTP Request
///
/// `DELETE [base]/api/v1/users/{user_id}`
pub async fn delete_user_handler(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> RestResult<Response> {
    debug!(user_id, "processing delete-by-user request");
    let deleted = state.engine().delete_by_user(user_id).await?;

    Ok((StatusCode::OK, Json(serde_json::json!({ "deleted": deleted }))).into_response())
}

/// Removes every document from the index.
///
/// Requires `confirm=true` so the irreversible operation cannot be
/// triggered by a stray DELETE.
///
/// # HTTP Request
///
/// `DELETE [base]/api/v1/clear?confirm=true`
pub async fn clear_handler(
    State(state): State<AppState>,
    Query(params): Query<ClearParams>,
) -> RestResult<Response> {
    if !params.confirm {
        return Err(RestError::bad_request(
            "clearing the index requires confirm=true",
        ));
    }

    warn!("processing clear request");
    state.engine().clear().await?;

    Ok((StatusCode::OK, Json(serde_json::json!({ "result": "ok" }))).into_response())
}
