//! HTTP request handlers for the JSON API.

pub mod chats;
pub mod messages;
pub mod users;

use std::time::Instant;

use tokio_util::sync::{CancellationToken, DropGuard};

use crate::http::error::{AppError, RequestError};

/// Per-request bookkeeping: id, timing and the cancellation token handed to
/// the service.
///
/// The token is cancelled when the context is dropped, which also happens
/// when axum drops the handler future after a client disconnect.
pub(crate) struct RequestContext {
    pub request_id: String,
    pub cancel: CancellationToken,
    start: Instant,
    _guard: DropGuard,
}

impl RequestContext {
    pub fn new() -> Self {
        let cancel = CancellationToken::new();
        Self {
            request_id: uuid::Uuid::now_v7().to_string(),
            _guard: cancel.clone().drop_guard(),
            cancel,
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Attach this request's id and timing to an error.
    pub fn fail(&self, error: impl Into<AppError>) -> RequestError {
        RequestError {
            error: error.into(),
            request_id: self.request_id.clone(),
            response_time_ms: self.elapsed_ms(),
        }
    }
}
