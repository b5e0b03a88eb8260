//! Observability for Parley: tracing subscriber setup and shutdown.

pub mod tracing_setup;
