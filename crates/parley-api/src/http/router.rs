//! Axum router configuration with middleware.
//!
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use parley_core::repository::store::ChatStore;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router<S: ChatStore + 'static>(state: AppState<S>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/users/add", post(handlers::users::add_user::<S>))
        .route("/chats/add", post(handlers::chats::create_chat::<S>))
        .route("/chats/get", post(handlers::chats::list_chats::<S>))
        .route("/messages/add", post(handlers::messages::add_message::<S>))
        .route("/messages/get", post(handlers::messages::list_messages::<S>))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Liveness probe.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use parley_core::repository::memory::InMemoryChatStore;
    use parley_core::service::messenger::{MessengerService, ServiceConfig};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app() -> (Router, AppState<InMemoryChatStore>) {
        let state = AppState::new(MessengerService::new(
            InMemoryChatStore::new(),
            ServiceConfig::default(),
        ));
        (build_router(state.clone()), state)
    }

    async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        post_raw(router, uri, body.to_string()).await
    }

    async fn post_raw(router: &Router, uri: &str, body: String) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn add_user(router: &Router, name: &str) -> i64 {
        let (status, body) = post_json(router, "/users/add", json!({ "username": name })).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (router, _) = app();
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn user_chat_message_flow() {
        let (router, _) = app();
        let alice = add_user(&router, "alice").await;
        let bob = add_user(&router, "bob").await;

        let (status, body) = post_json(
            &router,
            "/chats/add",
            json!({ "name": "general", "users": [bob, alice] }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let chat = body["data"]["id"].as_i64().unwrap();
        assert!(body["meta"]["request_id"].as_str().is_some_and(|id| !id.is_empty()));

        let (status, _) = post_json(
            &router,
            "/messages/add",
            json!({ "chat": chat, "author": alice, "text": "hi" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = post_json(&router, "/messages/get", json!({ "chat": chat })).await;
        assert_eq!(status, StatusCode::OK);
        let messages = body["data"]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["chat"], chat);
        assert_eq!(messages[0]["author"], alice);
        assert_eq!(messages[0]["text"], "hi");

        let (status, body) = post_json(&router, "/chats/get", json!({ "user": bob })).await;
        assert_eq!(status, StatusCode::OK);
        let chats = body["data"]["chats"].as_array().unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0]["name"], "general");
        assert_eq!(chats[0]["users"], json!([bob, alice]));
    }

    #[tokio::test]
    async fn chats_are_listed_by_recent_activity() {
        let (router, state) = app();
        let store = state.service.store();
        let at = |hour| Utc.with_ymd_and_hms(2020, 1, 1, hour, 0, 0).unwrap();

        store.freeze_clock(Some(at(9)));
        let alice = add_user(&router, "alice").await;
        let mut ids = Vec::new();
        for (hour, name) in [(10, "a"), (11, "b"), (12, "c")] {
            store.freeze_clock(Some(at(hour)));
            let (_, body) =
                post_json(&router, "/chats/add", json!({ "name": name, "users": [alice] })).await;
            ids.push(body["data"]["id"].as_i64().unwrap());
        }

        store.freeze_clock(Some(at(16)));
        post_json(
            &router,
            "/messages/add",
            json!({ "chat": ids[1], "author": alice, "text": "" }),
        )
        .await;

        let (_, body) = post_json(&router, "/chats/get", json!({ "user": alice })).await;
        let order: Vec<i64> = body["data"]["chats"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_i64().unwrap())
            .collect();
        assert_eq!(order, vec![ids[0], ids[2], ids[1]]);
    }

    #[tokio::test]
    async fn duplicate_user_is_conflict() {
        let (router, _) = app();
        add_user(&router, "alice").await;

        let (status, body) = post_json(&router, "/users/add", json!({ "username": "alice" })).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["errors"][0]["code"], "USER_EXISTS");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn chat_with_unknown_member_is_unprocessable() {
        let (router, _) = app();
        let alice = add_user(&router, "alice").await;

        let (status, body) = post_json(
            &router,
            "/chats/add",
            json!({ "name": "general", "users": [alice, 99] }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"][0]["message"], "nonexistent user");
    }

    #[tokio::test]
    async fn outsider_cannot_post() {
        let (router, _) = app();
        let alice = add_user(&router, "alice").await;
        let mallory = add_user(&router, "mallory").await;
        let (_, body) =
            post_json(&router, "/chats/add", json!({ "name": "general", "users": [alice] })).await;
        let chat = body["data"]["id"].as_i64().unwrap();

        let (status, body) = post_json(
            &router,
            "/messages/add",
            json!({ "chat": chat, "author": mallory, "text": "let me in" }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"][0]["code"], "NOT_MEMBER");
    }

    #[tokio::test]
    async fn invalid_input_is_bad_request() {
        let (router, _) = app();

        let (status, body) = post_json(&router, "/users/add", json!({ "username": "" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");

        let (status, body) = post_raw(&router, "/users/add", "{not json".to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["code"], "BAD_REQUEST");

        let (status, _) = post_json(&router, "/chats/add", json!({ "name": "general" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn zero_ids_are_invalid_input() {
        let (router, _) = app();
        add_user(&router, "alice").await;

        for (uri, body) in [
            ("/chats/add", json!({ "name": "general", "users": [0] })),
            ("/chats/get", json!({ "user": 0 })),
            ("/messages/get", json!({ "chat": 0 })),
            ("/messages/add", json!({ "chat": 0, "author": 1, "text": "hi" })),
        ] {
            let (status, body) = post_json(&router, uri, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}: {body}");
            assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn error_envelope_carries_request_id() {
        let (router, _) = app();
        add_user(&router, "alice").await;

        let (status, body) = post_json(&router, "/users/add", json!({ "username": "alice" })).await;
        assert_eq!(status, StatusCode::CONFLICT);
        let request_id = body["meta"]["request_id"].as_str().unwrap();
        assert!(uuid::Uuid::parse_str(request_id).is_ok(), "{request_id}");
    }

    #[tokio::test]
    async fn unknown_chat_has_no_messages() {
        let (router, _) = app();
        let (status, body) = post_json(&router, "/messages/get", json!({ "chat": 42 })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["messages"], json!([]));
    }
}
