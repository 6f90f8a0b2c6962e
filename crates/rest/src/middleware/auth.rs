//! Authentication middleware.
//!
//! Extracts credentials from the `X-API-Key` and `Authorization: Bearer`
//! headers, runs them through the engine's auth gate, and inserts the
//! resulting [`Identity`] into request extensions for handlers to read.
//! Applied to `/api/v1` routes only; `/health` stays public.

use axum::{
    extract::{Request, State},
    http::header::{AUTHORIZATION, HeaderName},
    middleware::Next,
    response::Response,
};
use searchgate_engine::{Identity, RequestCredentials};
use tracing::debug;

use crate::error::RestError;
use crate::state::AppState;

/// Header carrying the static key.
pub static X_API_KEY: HeaderName = HeaderName::from_static("x-api-key");

/// Pulls credentials out of the request headers.
pub fn extract_credentials(request: &Request) -> RequestCredentials {
    let api_key = request
        .headers()
        .get(&X_API_KEY)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let bearer_token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from);

    RequestCredentials {
        api_key,
        bearer_token,
    }
}

/// Middleware for `axum::middleware::from_fn_with_state`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, RestError> {
    let credentials = extract_credentials(&request);

    let identity = state
        .gate()
        .authenticate(&credentials)
        .map_err(|e| RestError::Unauthorized {
            message: e.to_string(),
        })?;

    debug!(anonymous = matches!(identity, Identity::Anonymous), "request authenticated");
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
