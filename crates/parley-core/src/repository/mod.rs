//! Store trait definition (port) and the in-memory implementation.
//!
//! `ChatStore` is the only surface the service layer sees, so the SQLite
//! store in parley-infra and `InMemoryChatStore` are interchangeable.

pub mod memory;
pub mod store;
