//! `SearchEngine` implementation for Elasticsearch.

use async_trait::async_trait;
use elasticsearch::cluster::ClusterHealthParts;
use elasticsearch::indices::IndicesStatsParts;
use elasticsearch::{CountParts, DeleteByQueryParts, IndexParts, SearchParts};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::EngineKind;
use crate::core::SearchEngine;
use crate::error::{BackendError, EngineError, EngineResult};
use crate::types::{
    ChatRef, ChatType, ClusterHealth, HealthStatus, IndexStats, Message, SearchHit, SearchQuery,
    SearchResults, UserRef,
};

use super::backend::ElasticsearchEngine;
use super::query;

/// Flat document shape stored in the index. Kept separate from [`Message`]
/// so the wire format can evolve without touching the public type.
#[derive(Debug, Serialize, Deserialize)]
struct EsDocument {
    message_id: i64,
    chat_id: i64,
    chat_type: ChatType,
    user_id: i64,
    username: String,
    text: String,
    timestamp: i64,
}

impl From<&Message> for EsDocument {
    fn from(message: &Message) -> Self {
        Self {
            message_id: message.message_id,
            chat_id: message.chat.id,
            chat_type: message.chat.kind,
            user_id: message.from_user.id,
            username: message.from_user.username.clone(),
            text: message.text.clone(),
            timestamp: message.timestamp,
        }
    }
}

impl From<EsDocument> for Message {
    fn from(doc: EsDocument) -> Self {
        Message {
            message_id: doc.message_id,
            text: doc.text,
            chat: ChatRef {
                id: doc.chat_id,
                kind: doc.chat_type,
            },
            from_user: UserRef {
                id: doc.user_id,
                username: doc.username,
            },
            timestamp: doc.timestamp,
        }
    }
}

fn serialization_error(context: &str, e: impl std::fmt::Display) -> EngineError {
    EngineError::Backend(BackendError::SerializationError {
        message: format!("{}: {}", context, e),
    })
}

impl ElasticsearchEngine {
    /// Runs a delete-by-query and returns the backend's deleted count.
    /// A missing index deletes nothing.
    async fn delete_by_query(&self, operation: &str, body: Value) -> EngineResult<u64> {
        let index = [self.index()];
        let response = self
            .send_with_retry(operation, || {
                self.client()
                    .delete_by_query(DeleteByQueryParts::Index(&index))
                    .body(body.clone())
                    .send()
            })
            .await?;

        if response.status_code().as_u16() == 404 {
            return Ok(0);
        }
        let response = self.check_response(operation, response).await?;
        let result = response
            .json::<Value>()
            .await
            .map_err(|e| serialization_error(operation, e))?;

        Ok(result["deleted"].as_u64().unwrap_or(0))
    }
}

#[async_trait]
impl SearchEngine for ElasticsearchEngine {
    fn name(&self) -> &'static str {
        "elasticsearch"
    }

    fn kind(&self) -> EngineKind {
        EngineKind::Elasticsearch
    }

    /// Creates the index with its mapping if it does not exist yet.
    /// Writes call this too, so a dropped index heals on the next upsert.
    async fn initialize(&self) -> EngineResult<()> {
        super::schema::ensure_index(self).await
    }

    async fn upsert(&self, message: &Message) -> EngineResult<()> {
        self.initialize().await?;

        let doc_id = message.document_id();
        let doc = serde_json::to_value(EsDocument::from(message))?;

        let response = self
            .send_with_retry("upsert", || {
                self.client()
                    .index(IndexParts::IndexId(self.index(), &doc_id))
                    .body(doc.clone())
                    .send()
            })
            .await?;
        self.check_response("upsert", response).await?;

        tracing::debug!(document_id = %doc_id, "indexed message");
        Ok(())
    }

    async fn search(&self, search_query: &SearchQuery) -> EngineResult<SearchResults> {
        // Window validation happens before any backend traffic.
        let body = query::search_body(search_query, self.config())?;
        let page = search_query.page.max(1);
        let page_size = search_query.effective_page_size(self.config().max_page_size);

        let index = [self.index()];
        let response = self
            .send_with_retry("search", || {
                self.client()
                    .search(SearchParts::Index(&index))
                    .body(body.clone())
                    .send()
            })
            .await?;

        if response.status_code().as_u16() == 404 {
            return Ok(SearchResults::empty(page, page_size));
        }
        let response = self.check_response("search", response).await?;
        let result = response
            .json::<Value>()
            .await
            .map_err(|e| serialization_error("search", e))?;

        let total_count = result["hits"]["total"]["value"].as_u64().unwrap_or(0);
        let mut hits = Vec::new();
        if let Some(raw_hits) = result["hits"]["hits"].as_array() {
            for raw in raw_hits {
                let doc: EsDocument = serde_json::from_value(raw["_source"].clone())
                    .map_err(|e| serialization_error("search hit", e))?;
                hits.push(SearchHit {
                    message: doc.into(),
                    score: raw["_score"].as_f64().unwrap_or(0.0),
                });
            }
        }

        Ok(SearchResults {
            hits,
            total_count,
            page,
            page_size,
        })
    }

    async fn delete_by_chat(&self, chat_id: i64) -> EngineResult<u64> {
        let deleted = self
            .delete_by_query("delete by chat", query::delete_by_chat_body(chat_id))
            .await?;
        tracing::info!(chat_id, deleted, "deleted messages by chat");
        Ok(deleted)
    }

    async fn delete_by_user(&self, user_id: i64) -> EngineResult<u64> {
        let deleted = self
            .delete_by_query("delete by user", query::delete_by_user_body(user_id))
            .await?;
        tracing::info!(user_id, deleted, "deleted messages by user");
        Ok(deleted)
    }

    async fn clear(&self) -> EngineResult<()> {
        let deleted = self.delete_by_query("clear", query::clear_body()).await?;
        tracing::warn!(deleted, "cleared the message index");
        Ok(())
    }

    async fn stats(&self) -> EngineResult<IndexStats> {
        let index = [self.index()];

        let response = self
            .send_with_retry("count", || {
                self.client().count(CountParts::Index(&index)).send()
            })
            .await?;
        let doc_count = if response.status_code().as_u16() == 404 {
            0
        } else {
            let response = self.check_response("count", response).await?;
            let body = response
                .json::<Value>()
                .await
                .map_err(|e| serialization_error("count", e))?;
            body["count"].as_u64().unwrap_or(0)
        };

        let response = self
            .send_with_retry("index stats", || async {
                self.client()
                    .indices()
                    .stats(IndicesStatsParts::Index(&index))
                    .send()
                    .await
            })
            .await?;
        let index_size_bytes = if response.status_code().as_u16() == 404 {
            0
        } else {
            let response = self.check_response("index stats", response).await?;
            let body = response
                .json::<Value>()
                .await
                .map_err(|e| serialization_error("index stats", e))?;
            body["_all"]["primaries"]["store"]["size_in_bytes"]
                .as_u64()
                .unwrap_or(0)
        };

        let response = self
            .send_with_retry("cluster health", || async {
                self.client()
                    .cluster()
                    .health(ClusterHealthParts::None)
                    .send()
                    .await
            })
            .await?;
        let response = self.check_response("cluster health", response).await?;
        let health = response
            .json::<Value>()
            .await
            .map_err(|e| serialization_error("cluster health", e))?;

        let cluster_health = match health["status"].as_str() {
            Some("green") => ClusterHealth::Green,
            Some("yellow") => ClusterHealth::Yellow,
            _ => ClusterHealth::Red,
        };

        Ok(IndexStats {
            doc_count,
            index_size_bytes,
            shard_count: self.config().shards,
            replica_count: self.config().replicas,
            cluster_health,
        })
    }

    async fn ping(&self) -> HealthStatus {
        let result = self
            .send_with_retry("ping", || async {
                self.client()
                    .cluster()
                    .health(ClusterHealthParts::None)
                    .send()
                    .await
            })
            .await;

        let response = match result {
            Ok(r) if r.status_code().is_success() => r,
            Ok(r) => {
                tracing::warn!(status = %r.status_code(), "ping got non-success status");
                return HealthStatus::Unreachable;
            }
            Err(e) => {
                tracing::warn!(error = %e, "ping failed");
                return HealthStatus::Unreachable;
            }
        };

        match response.json::<Value>().await {
            Ok(body) => match body["status"].as_str() {
                Some("green") => HealthStatus::Healthy,
                Some("yellow") => HealthStatus::Degraded,
                _ => HealthStatus::Unreachable,
            },
            Err(e) => {
                tracing::warn!(error = %e, "ping response unparsable");
                HealthStatus::Unreachable
            }
        }
    }
}
