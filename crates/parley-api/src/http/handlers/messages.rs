//! Message handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

use parley_core::repository::store::ChatStore;
use parley_types::chat::ChatId;
use parley_types::message::Message;
use parley_types::user::UserId;

use crate::http::error::RequestError;
use crate::http::handlers::RequestContext;
use crate::http::response::{ApiResponse, IdData};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddMessageRequest {
    pub chat: ChatId,
    pub author: UserId,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ListMessagesRequest {
    pub chat: ChatId,
}

#[derive(Debug, Serialize)]
pub struct MessageList {
    pub messages: Vec<Message>,
}

/// POST /messages/add - Post a message to a chat the author belongs to.
pub async fn add_message<S: ChatStore + 'static>(
    State(state): State<AppState<S>>,
    body: Result<Json<AddMessageRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<IdData>>, RequestError> {
    let ctx = RequestContext::new();
    let Json(body) = body.map_err(|e| ctx.fail(e))?;

    let id = state
        .service
        .add_message(body.author, body.chat, &body.text, &ctx.cancel)
        .await
        .map_err(|e| ctx.fail(e))?;

    Ok(Json(ApiResponse::success(
        IdData { id },
        ctx.request_id.clone(),
        ctx.elapsed_ms(),
    )))
}

/// POST /messages/get - Messages of a chat in posting order.
pub async fn list_messages<S: ChatStore + 'static>(
    State(state): State<AppState<S>>,
    body: Result<Json<ListMessagesRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<MessageList>>, RequestError> {
    let ctx = RequestContext::new();
    let Json(body) = body.map_err(|e| ctx.fail(e))?;

    let messages = state
        .service
        .messages_for_chat(body.chat, &ctx.cancel)
        .await
        .map_err(|e| ctx.fail(e))?;

    Ok(Json(ApiResponse::success(
        MessageList { messages },
        ctx.request_id.clone(),
        ctx.elapsed_ms(),
    )))
}
