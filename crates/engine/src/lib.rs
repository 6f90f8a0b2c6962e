//! Searchgate Engine
//!
//! Core of the searchgate message gateway: a pluggable full-text search
//! contract with an Elasticsearch adapter, request authentication, and the
//! canonical configuration model.
//!
//! # Architecture
//!
//! - [`types`] - Messages, search queries, results, and identities
//! - [`error`] - Error taxonomy for all operations
//! - [`config`] - Canonical configuration and its validator
//! - [`auth`] - Static-key and bearer-token authentication
//! - [`core`] - The [`SearchEngine`] trait and the engine factory
//! - [`backends`] - Backend implementations (Elasticsearch)
//!
//! # Quick Start
//!
//! ```no_run
//! use searchgate_engine::{Config, SearchQuery, build_engine};
//!
//! # async fn run() -> searchgate_engine::EngineResult<()> {
//! let config = Config::default();
//! config.validate()?;
//!
//! let engine = build_engine(&config)?;
//! let results = engine.search(&SearchQuery::new("hello").with_page(1)).await?;
//! println!("{} matching messages", results.total_count);
//! # Ok(())
//! # }
//! ```
//!
//! # Identity and idempotence
//!
//! A message is identified by `(chat.id, message_id)` and nothing else.
//! Re-indexing the same logical message replaces the stored document, so
//! callers may retry writes freely.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod auth;
pub mod backends;
pub mod config;
pub mod core;
pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use auth::{AuthGate, KeySource, RequestCredentials};
pub use config::{AuthConfig, Config, ElasticsearchConfig, EngineKind};
pub use core::{SearchEngine, build_engine};
pub use error::{AuthError, BackendError, ConfigError, EngineError, EngineResult};
pub use types::{
    ChatRef, ChatType, ClusterHealth, HealthStatus, Identity, IndexStats, Message, SearchHit,
    SearchQuery, SearchResults, UserRef,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
