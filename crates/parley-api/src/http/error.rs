//! Application error type mapping to HTTP status codes and envelope format.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use parley_types::error::ChatError;

use crate::http::response::ApiResponse;

/// Message shown for any failure the caller cannot act on.
pub const INTERNAL_MESSAGE: &str = "internal error";

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Errors from the messenger service.
    Chat(ChatError),
    /// The request body was not the expected JSON.
    BadRequest(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Chat(err) => {
                let (status, code) = match err {
                    ChatError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                    ChatError::UserExists(_) => (StatusCode::CONFLICT, "USER_EXISTS"),
                    ChatError::ChatExists(_) => (StatusCode::CONFLICT, "CHAT_EXISTS"),
                    ChatError::UnknownUsers => (StatusCode::UNPROCESSABLE_ENTITY, "UNKNOWN_USERS"),
                    ChatError::NotMember => (StatusCode::UNPROCESSABLE_ENTITY, "NOT_MEMBER"),
                    ChatError::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, "CANCELLED"),
                    ChatError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
                    ChatError::Storage(_) => {
                        return (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "INTERNAL_ERROR",
                            INTERNAL_MESSAGE.to_string(),
                        );
                    }
                };
                (status, code, err.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        RequestError {
            error: self,
            request_id: String::new(),
            response_time_ms: 0,
        }
        .into_response()
    }
}

/// An `AppError` tagged with the request it belongs to, so the error
/// envelope carries the same `meta` as a success would.
#[derive(Debug)]
pub struct RequestError {
    pub error: AppError,
    pub request_id: String,
    pub response_time_ms: u64,
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.error.parts();
        ApiResponse::error(code, &message, self.request_id, self.response_time_ms)
            .with_status(status)
    }
}
