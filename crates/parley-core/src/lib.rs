//! Store contract and use-case logic for Parley.
//!
//! This crate defines the `ChatStore` port that the infrastructure layer
//! implements, plus the messenger service that validates requests and
//! translates store errors. It never depends on `parley-infra` or any
//! database crate.

pub mod recency;
pub mod repository;
pub mod service;
pub mod validate;
