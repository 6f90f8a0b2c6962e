//! Core types for messages, search queries, and search results.
//!
//! A [`Message`] is owned by the caller; the engine only persists and
//! retrieves it. Its storage identity is derived solely from
//! `(chat.id, message_id)` so that re-indexing the same logical message
//! overwrites rather than duplicates.

use serde::{Deserialize, Serialize};

/// The kind of chat a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    /// One-on-one conversation.
    Private,
    /// Small group chat.
    Group,
    /// Large group chat.
    Supergroup,
    /// Broadcast channel.
    Channel,
    /// Anything the caller could not classify.
    #[default]
    #[serde(other)]
    Unknown,
}

/// Reference to the chat a message was posted in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRef {
    /// Chat identifier.
    pub id: i64,
    /// Chat kind.
    #[serde(rename = "type", default)]
    pub kind: ChatType,
}

/// Reference to the user who sent a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    /// User identifier.
    pub id: i64,
    /// Username at the time of indexing.
    #[serde(default)]
    pub username: String,
}

/// A message to be indexed or returned from a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier, local to its chat.
    pub message_id: i64,
    /// Full message text (UTF-8).
    pub text: String,
    /// The chat this message belongs to.
    pub chat: ChatRef,
    /// The sender. Serialized as `from`; `from_user` is accepted on input.
    #[serde(rename = "from", alias = "from_user")]
    pub from_user: UserRef,
    /// Unix timestamp in seconds.
    pub timestamp: i64,
}

impl Message {
    /// Returns the deterministic storage key for this message.
    ///
    /// Derived only from `(chat.id, message_id)`, never from content, so
    /// writing the same logical message twice replaces instead of
    /// duplicating.
    pub fn document_id(&self) -> String {
        format!("{}-{}", self.chat.id, self.message_id)
    }
}

/// A full-text search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// The keyword or phrase to search for.
    pub keyword: String,

    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: u32,

    /// Requested page size; clamped server-side to the configured maximum.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Restrict results to a single chat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<i64>,

    /// Restrict results to a single sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,

    /// Only messages with `timestamp >= after` (unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<i64>,

    /// Only messages with `timestamp <= before` (unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<i64>,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

impl SearchQuery {
    /// Creates a query for a keyword with default paging.
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            page: default_page(),
            page_size: default_page_size(),
            chat_id: None,
            user_id: None,
            after: None,
            before: None,
        }
    }

    /// Sets the page number.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Sets the page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Restricts results to a chat.
    pub fn with_chat(mut self, chat_id: i64) -> Self {
        self.chat_id = Some(chat_id);
        self
    }

    /// Restricts results to a sender.
    pub fn with_user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Returns the effective page size after clamping to `max_page_size`.
    ///
    /// A page size of zero is raised to one; anything above the maximum is
    /// lowered to it. Clamping bounds backend cost without rejecting the
    /// request.
    pub fn effective_page_size(&self, max_page_size: u32) -> u32 {
        self.page_size.clamp(1, max_page_size)
    }

    /// Returns the result-window offset for this query: `(page-1)*size`.
    pub fn offset(&self, max_page_size: u32) -> u64 {
        (u64::from(self.page.max(1)) - 1) * u64::from(self.effective_page_size(max_page_size))
    }
}

/// A single search hit: a message and its relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// The matched message.
    pub message: Message,
    /// Relevance score assigned by the backend.
    pub score: f64,
}

/// An ordered page of search hits plus totals and echoed paging info.
///
/// Not restartable across writes: `total_count` may shift if documents are
/// concurrently written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    /// Hits in ranking order.
    pub hits: Vec<SearchHit>,
    /// Total number of matching documents at query time.
    pub total_count: u64,
    /// The page that was served.
    pub page: u32,
    /// The effective (clamped) page size that was served.
    pub page_size: u32,
}

impl SearchResults {
    /// An empty result set for the given paging window.
    pub fn empty(page: u32, page_size: u32) -> Self {
        Self {
            hits: Vec::new(),
            total_count: 0,
            page,
            page_size,
        }
    }
}

/// Cluster health reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterHealth {
    Green,
    Yellow,
    Red,
}

/// Index statistics reported by [`crate::core::SearchEngine::stats`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of live documents in the index.
    pub doc_count: u64,
    /// Index size on disk in bytes.
    pub index_size_bytes: u64,
    /// Number of primary shards.
    pub shard_count: u32,
    /// Number of replicas per shard.
    pub replica_count: u32,
    /// Overall cluster health.
    pub cluster_health: ClusterHealth,
}

/// Liveness probe outcome.
///
/// Distinct from [`IndexStats`] in that a ping must not fail merely because
/// the index is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Backend reachable and fully operational.
    Healthy,
    /// Backend reachable but degraded (e.g. yellow cluster).
    Degraded,
    /// Backend not reachable.
    Unreachable,
}

/// The outcome of a successful authentication. Lives for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Authentication is disabled; every request is granted this identity.
    Anonymous,
    /// The caller presented the configured static key.
    StaticKey,
    /// The caller presented a valid signed bearer token.
    Jwt {
        /// Token subject (`sub`), if present.
        subject: Option<String>,
        /// Token issuer (`iss`).
        issuer: String,
        /// Token audience (`aud`).
        audience: String,
        /// Expiry as unix seconds (`exp`).
        expires_at: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(chat_id: i64, message_id: i64, text: &str) -> Message {
        Message {
            message_id,
            text: text.to_string(),
            chat: ChatRef {
                id: chat_id,
                kind: ChatType::Group,
            },
            from_user: UserRef {
                id: 7,
                username: "alice".to_string(),
            },
            timestamp: 1_700_000_000,
        }
    }

    #[test]
    fn test_document_id_is_derived_from_ids_only() {
        let a = message(123, 456, "first version");
        let b = message(123, 456, "edited version");
        assert_eq!(a.document_id(), "123-456");
        assert_eq!(a.document_id(), b.document_id());
    }

    #[test]
    fn test_document_id_negative_chat() {
        // Group chat ids are commonly negative.
        let m = message(-1001234, 9, "hi");
        assert_eq!(m.document_id(), "-1001234-9");
    }

    #[test]
    fn test_message_round_trips_through_json() {
        let m = message(1, 2, "你好");
        let json = serde_json::to_string(&m).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_chat_type_unknown_tolerated() {
        let m: Message = serde_json::from_value(serde_json::json!({
            "message_id": 1,
            "text": "x",
            "chat": {"id": 5, "type": "gigagroup"},
            "from_user": {"id": 2, "username": "bob"},
            "timestamp": 0
        }))
        .unwrap();
        assert_eq!(m.chat.kind, ChatType::Unknown);
    }

    #[test]
    fn test_query_defaults() {
        let q: SearchQuery = serde_json::from_str(r#"{"keyword":"hello"}"#).unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.page_size, 20);
        assert!(q.chat_id.is_none());
    }

    #[test]
    fn test_effective_page_size_clamps() {
        let q = SearchQuery::new("x").with_page_size(5000);
        assert_eq!(q.effective_page_size(100), 100);

        let q = SearchQuery::new("x").with_page_size(0);
        assert_eq!(q.effective_page_size(100), 1);

        let q = SearchQuery::new("x").with_page_size(25);
        assert_eq!(q.effective_page_size(100), 25);
    }

    #[test]
    fn test_offset_uses_clamped_size() {
        let q = SearchQuery::new("x").with_page(3).with_page_size(5000);
        // Offset is computed from the clamped size, so pages stay disjoint.
        assert_eq!(q.offset(100), 200);
    }
}
