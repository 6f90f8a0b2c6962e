//! Error types for the HTTP surface.
//!
//! Engine errors are mapped to HTTP status codes here and serialized as a
//! stable JSON body:
//!
//! ```json
//! { "error": "<kind>", "message": "<short text>" }
//! ```
//!
//! | Engine error | HTTP status |
//! |--------------|-------------|
//! | Validation | 400 |
//! | Auth | 401 |
//! | NotFound | 404 |
//! | Backend unavailable / timeout | 503 |
//! | Other backend errors | 500 |
//! | Config | 500 (should never reach a request) |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use searchgate_engine::{BackendError, EngineError};
use serde_json::json;
use std::fmt;

/// The primary error type for REST handlers.
#[derive(Debug)]
pub enum RestError {
    /// Bad request (HTTP 400).
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Authentication failed or missing (HTTP 401).
    Unauthorized {
        /// Error message. Deliberately vague.
        message: String,
    },

    /// Resource not found (HTTP 404).
    NotFound {
        /// What was not found.
        resource: String,
    },

    /// The search backend is unavailable (HTTP 503).
    ServiceUnavailable {
        /// Error message.
        message: String,
    },

    /// Internal server error (HTTP 500).
    InternalError {
        /// Error message.
        message: String,
    },
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::BadRequest { message } => write!(f, "Bad request: {}", message),
            RestError::Unauthorized { message } => write!(f, "Unauthorized: {}", message),
            RestError::NotFound { resource } => write!(f, "Not found: {}", resource),
            RestError::ServiceUnavailable { message } => {
                write!(f, "Service unavailable: {}", message)
            }
            RestError::InternalError { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for RestError {}

impl RestError {
    /// Convenience constructor for 400s.
    pub fn bad_request(message: impl Into<String>) -> Self {
        RestError::BadRequest {
            message: message.into(),
        }
    }

    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            RestError::BadRequest { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            RestError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "unauthorized"),
            RestError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            RestError::ServiceUnavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "backend_unavailable")
            }
            RestError::InternalError { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

impl From<EngineError> for RestError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation { message } => RestError::BadRequest { message },
            EngineError::Auth(e) => RestError::Unauthorized {
                message: e.to_string(),
            },
            EngineError::NotFound { resource } => RestError::NotFound { resource },
            EngineError::Backend(
                BackendError::Unavailable { .. }
                | BackendError::ConnectionFailed { .. }
                | BackendError::Timeout { .. },
            ) => RestError::ServiceUnavailable {
                message: "search backend is unavailable".to_string(),
            },
            // Raw backend detail was already logged at the engine layer.
            EngineError::Backend(_) => RestError::InternalError {
                message: "search backend request failed".to_string(),
            },
            EngineError::Config(e) => {
                tracing::error!(error = %e, "configuration error surfaced at request time");
                RestError::InternalError {
                    message: "server misconfiguration".to_string(),
                }
            }
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        let message = match &self {
            RestError::BadRequest { message }
            | RestError::Unauthorized { message }
            | RestError::ServiceUnavailable { message }
            | RestError::InternalError { message } => message.clone(),
            RestError::NotFound { resource } => format!("{} not found", resource),
        };

        let body = json!({
            "error": kind,
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}

/// Result type alias for REST handlers.
pub type RestResult<T> = Result<T, RestError>;
