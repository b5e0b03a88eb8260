//! Chat handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

use parley_core::repository::store::ChatStore;
use parley_types::chat::Chat;
use parley_types::user::UserId;

use crate::http::error::RequestError;
use crate::http::handlers::RequestContext;
use crate::http::response::{ApiResponse, IdData};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateChatRequest {
    pub name: String,
    pub users: Vec<UserId>,
}

#[derive(Debug, Deserialize)]
pub struct ListChatsRequest {
    pub user: UserId,
}

#[derive(Debug, Serialize)]
pub struct ChatList {
    pub chats: Vec<Chat>,
}

/// POST /chats/add - Create a chat with its members.
pub async fn create_chat<S: ChatStore + 'static>(
    State(state): State<AppState<S>>,
    body: Result<Json<CreateChatRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<IdData>>, RequestError> {
    let ctx = RequestContext::new();
    let Json(body) = body.map_err(|e| ctx.fail(e))?;

    let id = state
        .service
        .create_chat(&body.name, &body.users, &ctx.cancel)
        .await
        .map_err(|e| ctx.fail(e))?;

    Ok(Json(ApiResponse::success(
        IdData { id },
        ctx.request_id.clone(),
        ctx.elapsed_ms(),
    )))
}

/// POST /chats/get - A user's chats, least recently active first.
pub async fn list_chats<S: ChatStore + 'static>(
    State(state): State<AppState<S>>,
    body: Result<Json<ListChatsRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ChatList>>, RequestError> {
    let ctx = RequestContext::new();
    let Json(body) = body.map_err(|e| ctx.fail(e))?;

    let chats = state
        .service
        .chats_for_user(body.user, &ctx.cancel)
        .await
        .map_err(|e| ctx.fail(e))?;

    Ok(Json(ApiResponse::success(
        ChatList { chats },
        ctx.request_id.clone(),
        ctx.elapsed_ms(),
    )))
}
