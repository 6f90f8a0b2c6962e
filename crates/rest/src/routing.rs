//! Route configuration.

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::handlers;
use crate::middleware::auth::auth_middleware;
use crate::state::AppState;

/// Creates all gateway routes.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Process liveness
///
/// ## Authenticated (`/api/v1`)
/// - `POST /api/v1/upsert` - Index one message
/// - `POST /api/v1/search` - Full-text search
/// - `DELETE /api/v1/messages?chat_id=X` - Delete a chat's messages
/// - `DELETE /api/v1/users/{user_id}` - Delete a user's messages
/// - `DELETE /api/v1/clear?confirm=true` - Empty the index
/// - `GET /api/v1/ping` - Backend liveness and light stats
/// - `GET /api/v1/stats` - Full index statistics
pub fn create_routes(state: AppState) -> Router {
    let api = Router::new()
        .route("/upsert", post(handlers::upsert::upsert_handler))
        .route("/search", post(handlers::search::search_handler))
        .route(
            "/messages",
            delete(handlers::delete::delete_messages_handler),
        )
        .route(
            "/users/{user_id}",
            delete(handlers::delete::delete_user_handler),
        )
        .route("/clear", delete(handlers::delete::clear_handler))
        .route("/ping", get(handlers::stats::ping_handler))
        .route("/stats", get(handlers::stats::stats_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .nest("/api/v1", api)
        .with_state(state)
}
