//! Elasticsearch adapter.
//!
//! One index holds all messages. Text is indexed twice: `text` with the
//! standard analyzer for space-delimited languages and `text.cjk` with the
//! built-in bigram analyzer so Han/Hiragana/Katakana/Hangul queries match as
//! substrings without a tokenizer dictionary.

mod backend;
mod engine_impl;
pub(crate) mod query;
pub(crate) mod schema;

pub use backend::ElasticsearchEngine;
