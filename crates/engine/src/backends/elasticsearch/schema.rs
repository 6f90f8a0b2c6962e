//! Index settings and mapping for the message index.

use elasticsearch::indices::{IndicesCreateParts, IndicesExistsParts};
use serde_json::json;

use crate::config::ElasticsearchConfig;
use crate::error::{BackendError, EngineError, EngineResult};

use super::backend::ElasticsearchEngine;

/// Builds the settings and mapping document for the message index.
///
/// `text` is analyzed twice: the `standard` analyzer serves space-delimited
/// languages, and the `text.cjk` subfield uses the built-in `cjk` analyzer,
/// which emits overlapping bigrams for Han, Hiragana, Katakana, and Hangul.
/// A two-character query therefore matches anywhere inside a longer CJK
/// message. `timestamp` is stored as epoch seconds so range filters need no
/// format negotiation with callers.
pub fn index_mapping(config: &ElasticsearchConfig) -> serde_json::Value {
    json!({
        "settings": {
            "number_of_shards": config.shards,
            "number_of_replicas": config.replicas,
            "index.max_result_window": config.max_result_window
        },
        "mappings": {
            "properties": {
                "message_id": { "type": "long" },
                "chat_id": { "type": "long" },
                "chat_type": { "type": "keyword" },
                "user_id": { "type": "long" },
                "username": { "type": "keyword" },
                "text": {
                    "type": "text",
                    "analyzer": "standard",
                    "fields": {
                        "cjk": {
                            "type": "text",
                            "analyzer": "cjk"
                        }
                    }
                },
                "timestamp": {
                    "type": "date",
                    "format": "epoch_second"
                }
            }
        }
    })
}

/// Creates the message index if it does not exist yet.
///
/// Tolerates the create/create race: a concurrent
/// `resource_already_exists_exception` is success.
pub async fn ensure_index(engine: &ElasticsearchEngine) -> EngineResult<()> {
    let index = [engine.index()];

    let exists = engine
        .send_with_retry("index exists", || async {
            engine
                .client()
                .indices()
                .exists(IndicesExistsParts::Index(&index))
                .send()
                .await
        })
        .await?;

    if exists.status_code().is_success() {
        return Ok(());
    }

    let mapping = index_mapping(engine.config());
    let response = engine
        .send_with_retry("index create", || async {
            engine
                .client()
                .indices()
                .create(IndicesCreateParts::Index(engine.index()))
                .body(mapping.clone())
                .send()
                .await
        })
        .await?;

    let status = response.status_code();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        if body.contains("resource_already_exists_exception") {
            return Ok(());
        }
        tracing::error!(index = engine.index(), status = %status, body = %body, "index creation failed");
        return Err(EngineError::Backend(BackendError::QueryError {
            message: format!("failed to create index {}", engine.index()),
        }));
    }

    tracing::info!(index = engine.index(), "created message index");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_structure() {
        let mut config = ElasticsearchConfig::default();
        config.shards = 3;
        config.replicas = 2;
        let mapping = index_mapping(&config);

        assert_eq!(mapping["settings"]["number_of_shards"], 3);
        assert_eq!(mapping["settings"]["number_of_replicas"], 2);
        assert_eq!(mapping["settings"]["index.max_result_window"], 10000);

        let props = &mapping["mappings"]["properties"];
        assert_eq!(props["chat_id"]["type"], "long");
        assert_eq!(props["username"]["type"], "keyword");
        assert_eq!(props["text"]["analyzer"], "standard");
        assert_eq!(props["text"]["fields"]["cjk"]["analyzer"], "cjk");
        assert_eq!(props["timestamp"]["format"], "epoch_second");
    }
}
