//! User handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;

use parley_core::repository::store::ChatStore;

use crate::http::error::RequestError;
use crate::http::handlers::RequestContext;
use crate::http::response::{ApiResponse, IdData};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddUserRequest {
    pub username: String,
}

/// POST /users/add - Register a user.
pub async fn add_user<S: ChatStore + 'static>(
    State(state): State<AppState<S>>,
    body: Result<Json<AddUserRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<IdData>>, RequestError> {
    let ctx = RequestContext::new();
    let Json(body) = body.map_err(|e| ctx.fail(e))?;

    let id = state
        .service
        .add_user(&body.username, &ctx.cancel)
        .await
        .map_err(|e| ctx.fail(e))?;

    Ok(Json(ApiResponse::success(
        IdData { id },
        ctx.request_id.clone(),
        ctx.elapsed_ms(),
    )))
}
