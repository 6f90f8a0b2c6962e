//! HTTP request handlers, one module per operation group.

pub mod delete;
pub mod health;
pub mod search;
pub mod stats;
pub mod upsert;
