//! Infrastructure layer for Parley.
//!
//! Contains the SQLite implementation of the `ChatStore` trait defined in
//! `parley-core` and the configuration loader.

pub mod config;
pub mod sqlite;
