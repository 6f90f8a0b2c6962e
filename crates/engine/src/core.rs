//! The pluggable search-engine contract.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, EngineKind};
use crate::error::{ConfigError, EngineResult};
use crate::types::{HealthStatus, IndexStats, Message, SearchQuery, SearchResults};

/// Contract every search backend must satisfy.
///
/// All operations are async and safe to call concurrently; implementations
/// hold no per-request state. Write operations are idempotent by document
/// key, and deletes are safe to repeat.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Stable backend name for logs and diagnostics.
    fn name(&self) -> &'static str;

    /// The kind of backend this is.
    fn kind(&self) -> EngineKind;

    /// Prepares backend structures (index, mapping). Idempotent; called at
    /// startup and safe to call again.
    async fn initialize(&self) -> EngineResult<()> {
        Ok(())
    }

    /// Indexes a message, replacing any previous version with the same
    /// `(chat.id, message_id)` identity.
    async fn upsert(&self, message: &Message) -> EngineResult<()>;

    /// Runs a full-text search and returns one page of ranked hits.
    async fn search(&self, query: &SearchQuery) -> EngineResult<SearchResults>;

    /// Deletes every message belonging to a chat. Returns the number of
    /// documents removed.
    async fn delete_by_chat(&self, chat_id: i64) -> EngineResult<u64>;

    /// Deletes every message sent by a user. Returns the number of
    /// documents removed.
    async fn delete_by_user(&self, user_id: i64) -> EngineResult<u64>;

    /// Removes every document from the index. Irreversible.
    async fn clear(&self) -> EngineResult<()>;

    /// Returns document count, on-disk size, and shard layout.
    async fn stats(&self) -> EngineResult<IndexStats>;

    /// Liveness probe. Infallible by design: an unreachable backend is a
    /// status, not an error, and an empty index is healthy.
    async fn ping(&self) -> HealthStatus;
}

/// Builds the configured search engine.
///
/// Only the Elasticsearch adapter exists; the other recognized kinds fail
/// fast here rather than at first use. The config must already have passed
/// [`Config::validate`].
pub fn build_engine(config: &Config) -> EngineResult<Arc<dyn SearchEngine>> {
    let kind = config.engine_kind()?;
    match kind {
        EngineKind::Elasticsearch => {
            let engine = crate::backends::elasticsearch::ElasticsearchEngine::new(
                config.elasticsearch.clone(),
            )?;
            Ok(Arc::new(engine))
        }
        other => Err(ConfigError::UnsupportedEngine {
            kind: other.to_string(),
        }
        .into()),
    }
}
