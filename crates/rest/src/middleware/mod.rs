//! Axum middleware for the gateway.

pub mod auth;
