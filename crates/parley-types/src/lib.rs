//! Shared domain types for Parley.
//!
//! Users, chats and messages, the error enums shared by the store and the
//! service layer, and the configuration types.
//!
//! Zero infrastructure dependencies: only serde, chrono and thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod message;
pub mod user;
