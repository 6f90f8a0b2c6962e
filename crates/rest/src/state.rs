//! Application state shared by all request handlers.

use std::sync::Arc;

use searchgate_engine::auth::AuthGate;
use searchgate_engine::{Config, SearchEngine};

/// Shared application state for the REST layer.
///
/// The engine is held as a trait object rather than a type parameter
/// because backend selection is a runtime configuration decision. Cloning
/// is cheap; everything inside is an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The search engine backing all operations.
    engine: Arc<dyn SearchEngine>,

    /// Authentication gate applied to /api/v1 routes.
    gate: Arc<AuthGate>,

    /// The validated canonical configuration.
    config: Arc<Config>,
}

impl AppState {
    /// Creates a new AppState.
    pub fn new(engine: Arc<dyn SearchEngine>, gate: AuthGate, config: Config) -> Self {
        Self {
            engine,
            gate: Arc::new(gate),
            config: Arc::new(config),
        }
    }

    /// Returns the search engine.
    pub fn engine(&self) -> &Arc<dyn SearchEngine> {
        &self.engine
    }

    /// Returns the authentication gate.
    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}
