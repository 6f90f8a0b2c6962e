//! Error types for the gateway core.
//!
//! This module defines the error taxonomy used throughout the engine crate,
//! separating configuration errors (fatal, startup-only), authentication
//! errors (per-request), validation errors (caught before backend dispatch),
//! and backend errors (wrapped, never exposing raw backend text).

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration errors (fatal; the process must not serve traffic).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Authentication errors (per-request, never retried).
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Malformed or out-of-bound input, caught before any backend call.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A requested resource does not exist.
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// Errors originating from the search backend.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl EngineError {
    /// Convenience constructor for validation errors.
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation {
            message: message.into(),
        }
    }
}

/// Errors produced while validating or normalizing configuration.
///
/// Validation is fail-fast: the first violation found is returned.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The server port is outside [1, 65535].
    #[error("server.port must be in [1, 65535], got {port}")]
    InvalidPort { port: u32 },

    /// The configured engine type string is not a known kind.
    #[error("unknown search_engine.type: {value}")]
    UnknownEngineKind { value: String },

    /// The engine kind is recognized but has no working adapter.
    #[error("search engine '{kind}' is not implemented; only 'elasticsearch' is available")]
    UnsupportedEngine { kind: String },

    /// A required field is empty or missing.
    #[error("missing required field: {field}")]
    MissingField { field: String },

    /// A numeric field that must be strictly positive is not.
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: String, value: i64 },

    /// Public-key material could not be read or parsed.
    #[error("invalid key material for {field}: {message}")]
    InvalidKeyMaterial { field: String, message: String },
}

/// Errors produced by the authentication gate.
///
/// Deliberately coarse: callers only learn that authentication failed,
/// never which check tripped first.
#[derive(Error, Debug)]
pub enum AuthError {
    /// No credentials were supplied on a request that requires them.
    #[error("missing credentials")]
    MissingCredentials,

    /// The supplied static key does not match the configured secret.
    #[error("invalid api key")]
    InvalidKey,

    /// The bearer token failed signature, claim, or time-window checks.
    #[error("invalid bearer token")]
    InvalidToken,
}

/// Errors originating from the search backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend is unreachable or persistently failing after retry.
    #[error("backend unavailable: {backend_name}")]
    Unavailable {
        backend_name: String,
        message: String,
    },

    /// Connection to the backend could not be established.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// The request exceeded the configured deadline. Not retried.
    #[error("backend request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// A query was rejected or failed to execute at the backend.
    #[error("query execution failed: {message}")]
    QueryError { message: String },

    /// Serialization/deserialization of backend payloads failed.
    #[error("serialization error: {message}")]
    SerializationError { message: String },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Backend(BackendError::SerializationError {
            message: err.to_string(),
        })
    }
}
