//! # searchgate-rest - Gateway HTTP surface
//!
//! This crate exposes the searchgate message-search engine over HTTP. It
//! owns routing, authentication middleware, error-to-status mapping, and
//! the flat server configuration surface.
//!
//! ## API Endpoints
//!
//! | Operation | HTTP Method | URL Pattern | Auth |
//! |-----------|-------------|-------------|------|
//! | upsert | POST | `/api/v1/upsert` | yes |
//! | search | POST | `/api/v1/search` | yes |
//! | delete by chat | DELETE | `/api/v1/messages?chat_id=X` | yes |
//! | delete by user | DELETE | `/api/v1/users/{user_id}` | yes |
//! | clear | DELETE | `/api/v1/clear?confirm=true` | yes |
//! | ping | GET | `/api/v1/ping` | yes |
//! | stats | GET | `/api/v1/stats` | yes |
//! | health | GET | `/health` | no |
//!
//! Credentials travel in `X-API-Key: <secret>` or
//! `Authorization: Bearer <token>`.
//!
//! ## Error Handling
//!
//! Errors are returned as `{ "error": "<kind>", "message": "<text>" }`:
//!
//! | HTTP Status | Kind | Description |
//! |-------------|------|-------------|
//! | 400 | validation_error | Malformed input, window exceeded |
//! | 401 | unauthorized | Missing or invalid credentials |
//! | 404 | not_found | Unknown resource |
//! | 503 | backend_unavailable | Search backend down or timing out |
//! | 500 | internal_error | Everything else |
//!
//! ## Architecture
//!
//! - [`config`] - Flat clap configuration, normalized into the engine config
//! - [`error`] - Error types and status mapping
//! - [`state`] - Application state (engine, auth gate, configuration)
//! - [`middleware`] - Authentication middleware
//! - [`handlers`] - One handler module per operation group
//! - [`routing`] - Route configuration

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routing;
pub mod state;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::{RestError, RestResult};
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use searchgate_engine::auth::AuthGate;
use searchgate_engine::{Config, SearchEngine};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the Axum application.
///
/// # Arguments
///
/// * `engine` - The search engine backing all operations
/// * `gate` - The authentication gate (built from the same config)
/// * `config` - The validated canonical configuration
/// * `enable_cors` - Whether to attach a permissive CORS layer
pub fn create_app(
    engine: Arc<dyn SearchEngine>,
    gate: AuthGate,
    config: Config,
    enable_cors: bool,
) -> Router {
    info!("creating gateway with backend: {}", engine.name());

    let timeout_secs = config.server.read_timeout_secs;
    let state = AppState::new(engine, gate, config);
    let router = routing::create_routes(state);

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(timeout_secs),
        ));

    let router = if enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    };

    router.layer(service_builder)
}

/// Initializes the tracing subscriber for logging.
///
/// Call once at application startup.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("searchgate={0},searchgate_rest={0},searchgate_engine={0},tower_http=debug", level))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
