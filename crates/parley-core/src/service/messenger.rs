//! Messenger service: users, chats and messages on top of a `ChatStore`.
//!
//! Every operation takes a `CancellationToken` supplied by the caller and is
//! bounded by the configured request timeout. When either fires, the
//! in-flight store future is dropped, which aborts a running recency fan-out
//! and rolls back an open chat-creation transaction.

use std::future::Future;
use std::time::Duration;

use parley_types::chat::{Chat, ChatId};
use parley_types::config::ServerConfig;
use parley_types::error::{ChatError, RepositoryError};
use parley_types::message::{Message, MessageId};
use parley_types::user::UserId;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::repository::store::ChatStore;
use crate::validate::{validate_id, validate_members, validate_name};

/// Service settings, passed in at construction.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Upper bound on the store work of a single call.
    pub request_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&ServerConfig> for ServiceConfig {
    fn from(server: &ServerConfig) -> Self {
        Self {
            request_timeout: server.request_timeout(),
        }
    }
}

/// Orchestrates validation, pre-checks and store calls.
///
/// Generic over `ChatStore` so the SQLite store and the in-memory store are
/// interchangeable.
pub struct MessengerService<S: ChatStore> {
    store: S,
    config: ServiceConfig,
}

/// Log the detail of an infrastructure failure and hide it behind
/// `ChatError::Storage`.
fn storage_error(operation: &'static str, err: RepositoryError) -> ChatError {
    error!(operation, error = %err, "store operation failed");
    ChatError::Storage(err.to_string())
}

impl<S: ChatStore> MessengerService<S> {
    pub fn new(store: S, config: ServiceConfig) -> Self {
        Self { store, config }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run `work` until it finishes, the token is cancelled, or the request
    /// timeout elapses.
    async fn guarded<T, F>(&self, cancel: &CancellationToken, work: F) -> Result<T, ChatError>
    where
        F: Future<Output = Result<T, ChatError>>,
    {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("request cancelled before store work finished");
                Err(ChatError::Cancelled)
            }
            outcome = tokio::time::timeout(self.config.request_timeout, work) => {
                outcome.unwrap_or(Err(ChatError::Timeout))
            }
        }
    }

    /// Register a new user and return its id.
    pub async fn add_user(
        &self,
        username: &str,
        cancel: &CancellationToken,
    ) -> Result<UserId, ChatError> {
        validate_name("username", username)?;

        self.guarded(cancel, async {
            let exists = self
                .store
                .user_exists(username)
                .await
                .map_err(|e| storage_error("user_exists", e))?;
            if exists {
                return Err(ChatError::UserExists(username.to_string()));
            }

            let id = self.store.add_user(username).await.map_err(|e| match e {
                RepositoryError::Conflict(_) => ChatError::UserExists(username.to_string()),
                other => storage_error("add_user", other),
            })?;
            info!(user_id = id, username, "user added");
            Ok(id)
        })
        .await
    }

    /// Create a chat with the given members and return its id.
    ///
    /// The name must be free and every member must exist; both are checked
    /// before the store transaction starts.
    pub async fn create_chat(
        &self,
        name: &str,
        member_ids: &[UserId],
        cancel: &CancellationToken,
    ) -> Result<ChatId, ChatError> {
        validate_name("chat name", name)?;
        validate_members(member_ids)?;

        self.guarded(cancel, async {
            let exists = self
                .store
                .chat_exists(name)
                .await
                .map_err(|e| storage_error("chat_exists", e))?;
            if exists {
                return Err(ChatError::ChatExists(name.to_string()));
            }

            let members_exist = self
                .store
                .users_exist_by_ids(member_ids)
                .await
                .map_err(|e| storage_error("users_exist_by_ids", e))?;
            if !members_exist {
                return Err(ChatError::UnknownUsers);
            }

            let id = self
                .store
                .create_chat(name, member_ids)
                .await
                .map_err(|e| match e {
                    RepositoryError::Conflict(_) => ChatError::ChatExists(name.to_string()),
                    other => storage_error("create_chat", other),
                })?;
            info!(chat_id = id, chat_name = name, members = ?member_ids, "chat created");
            Ok(id)
        })
        .await
    }

    /// The user's chats, oldest activity first.
    pub async fn chats_for_user(
        &self,
        user_id: UserId,
        cancel: &CancellationToken,
    ) -> Result<Vec<Chat>, ChatError> {
        validate_id("user", user_id)?;

        self.guarded(cancel, async {
            self.store
                .chats_for_user(user_id)
                .await
                .map_err(|e| storage_error("chats_for_user", e))
        })
        .await
    }

    /// Post a message on behalf of a chat member and return its id.
    pub async fn add_message(
        &self,
        author_id: UserId,
        chat_id: ChatId,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<MessageId, ChatError> {
        validate_id("author", author_id)?;
        validate_id("chat", chat_id)?;

        self.guarded(cancel, async {
            let id = self
                .store
                .add_message(author_id, chat_id, text)
                .await
                .map_err(|e| match e {
                    RepositoryError::NotMember { .. } => ChatError::NotMember,
                    other => storage_error("add_message", other),
                })?;
            debug!(message_id = id, chat_id, author_id, "message added");
            Ok(id)
        })
        .await
    }

    /// Messages of a chat in the order they were posted.
    pub async fn messages_for_chat(
        &self,
        chat_id: ChatId,
        cancel: &CancellationToken,
    ) -> Result<Vec<Message>, ChatError> {
        validate_id("chat", chat_id)?;

        self.guarded(cancel, async {
            self.store
                .messages_for_chat(chat_id)
                .await
                .map_err(|e| storage_error("messages_for_chat", e))
        })
        .await
    }
}
