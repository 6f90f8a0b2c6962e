//! Backend implementations of the [`crate::core::SearchEngine`] contract.

pub mod elasticsearch;
