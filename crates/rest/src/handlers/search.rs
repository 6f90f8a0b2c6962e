//! Full-text search handler.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use searchgate_engine::SearchQuery;
use tracing::debug;

use crate::error::{RestError, RestResult};
use crate::state::AppState;

/// Runs a search and returns one page of ranked hits.
///
/// # HTTP Request
///
/// `POST [base]/api/v1/search`
///
/// # Response
///
/// - `200 OK` with a `SearchResults` body
/// - `400 Bad Request` for an empty keyword or a page past the result window
pub async fn search_handler(
    State(state): State<AppState>,
    Json(query): Json<SearchQuery>,
) -> RestResult<Response> {
    if query.keyword.trim().is_empty() {
        return Err(RestError::bad_request("keyword must not be empty"));
    }

    debug!(
        keyword = %query.keyword,
        page = query.page,
        page_size = query.page_size,
        "processing search request"
    );

    let results = state.engine().search(&query).await?;

    Ok((StatusCode::OK, Json(results)).into_response())
}
