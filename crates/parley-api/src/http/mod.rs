//! JSON HTTP API layer for Parley.
//!
//! Axum routes with envelope responses, CORS and request tracing.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
