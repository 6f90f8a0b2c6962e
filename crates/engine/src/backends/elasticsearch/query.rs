//! Pure query construction for the Elasticsearch adapter.
//!
//! Everything here builds JSON bodies without touching the network, so it
//! can be tested exhaustively without a cluster.

use serde_json::{Value, json};

use crate::config::ElasticsearchConfig;
use crate::error::{EngineError, EngineResult};
use crate::types::SearchQuery;

/// Returns true when the text contains at least one CJK codepoint.
///
/// Covers the unified Han block and its extension A, Hiragana, Katakana,
/// and the Hangul syllable block.
pub(crate) fn contains_cjk(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c as u32,
            0x4E00..=0x9FFF
            | 0x3400..=0x4DBF
            | 0x3040..=0x309F
            | 0x30A0..=0x30FF
            | 0xAC00..=0xD7AF
        )
    })
}

/// Builds the `_search` request body for a query.
///
/// CJK keywords go to the bigram subfield so a short query matches inside
/// longer text; everything else is matched on the standard-analyzed field.
/// Both use `operator: and` so multi-term queries require every term.
/// Fails with a validation error when the requested window would reach past
/// the deep-pagination ceiling.
pub(crate) fn search_body(query: &SearchQuery, config: &ElasticsearchConfig) -> EngineResult<Value> {
    let size = query.effective_page_size(config.max_page_size);
    let from = query.offset(config.max_page_size);

    if from + u64::from(size) > u64::from(config.max_result_window) {
        return Err(EngineError::validation(format!(
            "page {} with page_size {} exceeds the result window of {}",
            query.page.max(1),
            size,
            config.max_result_window
        )));
    }

    let field = if contains_cjk(&query.keyword) {
        "text.cjk"
    } else {
        "text"
    };

    let mut filters: Vec<Value> = Vec::new();
    if let Some(chat_id) = query.chat_id {
        filters.push(json!({ "term": { "chat_id": chat_id } }));
    }
    if let Some(user_id) = query.user_id {
        filters.push(json!({ "term": { "user_id": user_id } }));
    }
    if query.after.is_some() || query.before.is_some() {
        let mut range = serde_json::Map::new();
        if let Some(after) = query.after {
            range.insert("gte".to_string(), json!(after));
        }
        if let Some(before) = query.before {
            range.insert("lte".to_string(), json!(before));
        }
        filters.push(json!({ "range": { "timestamp": range } }));
    }

    Ok(json!({
        "query": {
            "bool": {
                "must": [
                    {
                        "match": {
                            field: {
                                "query": query.keyword,
                                "operator": "and"
                            }
                        }
                    }
                ],
                "filter": filters
            }
        },
        "from": from,
        "size": size,
        // _id breaks score/timestamp ties so paging is a total order.
        "sort": [
            { "_score": "desc" },
            { "timestamp": "desc" },
            { "_id": "asc" }
        ]
    }))
}

/// Body deleting every message of one chat.
pub(crate) fn delete_by_chat_body(chat_id: i64) -> Value {
    json!({ "query": { "term": { "chat_id": chat_id } } })
}

/// Body deleting every message of one sender.
pub(crate) fn delete_by_user_body(user_id: i64) -> Value {
    json!({ "query": { "term": { "user_id": user_id } } })
}

/// Body deleting every document in the index.
pub(crate) fn clear_body() -> Value {
    json!({ "query": { "match_all": {} } })
}
