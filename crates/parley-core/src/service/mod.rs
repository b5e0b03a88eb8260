//! Business logic services (use cases).
//!
//! Services validate requests, run the pre-checks the store expects its
//! callers to make, and translate store errors. They depend on the
//! `ChatStore` trait, never on a concrete implementation.

pub mod messenger;
