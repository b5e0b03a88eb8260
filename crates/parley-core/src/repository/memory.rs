//! In-memory `ChatStore` implementation.
//!
//! Keeps the same contracts as the SQLite store (uniqueness conflicts,
//! all-or-nothing chat creation, membership precondition, insertion order,
//! recency ordering) without a database. Intended for tests of the layers
//! built on top of the store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use parley_types::chat::{Chat, ChatId};
use parley_types::error::RepositoryError;
use parley_types::message::{Message, MessageId};
use parley_types::user::{User, UserId};

use super::store::ChatStore;
use crate::recency::order_by_recency;

#[derive(Default)]
struct State {
    users: Vec<User>,
    chats: Vec<StoredChat>,
    messages: Vec<Message>,
    /// When set, used instead of `Utc::now()` for new rows.
    frozen_now: Option<DateTime<Utc>>,
}

struct StoredChat {
    id: ChatId,
    name: String,
    created_at: DateTime<Utc>,
    members: Vec<UserId>,
}

impl State {
    fn now(&self) -> DateTime<Utc> {
        self.frozen_now.unwrap_or_else(Utc::now)
    }

    fn next_id(len: usize) -> i64 {
        len as i64 + 1
    }
}

/// `ChatStore` backed by plain vectors behind a mutex.
#[derive(Default)]
pub struct InMemoryChatStore {
    state: Mutex<State>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the timestamp given to rows created from now on. `None` restores
    /// the wall clock.
    pub fn freeze_clock(&self, at: Option<DateTime<Utc>>) {
        if let Ok(mut state) = self.state.lock() {
            state.frozen_now = at;
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Query("in-memory store poisoned".to_string()))
    }
}

impl ChatStore for InMemoryChatStore {
    async fn user_exists(&self, username: &str) -> Result<bool, RepositoryError> {
        let state = self.lock()?;
        Ok(state.users.iter().any(|u| u.username == username))
    }

    async fn users_exist_by_ids(&self, ids: &[UserId]) -> Result<bool, RepositoryError> {
        if ids.is_empty() {
            return Err(RepositoryError::InvalidArgument(
                "user id set must not be empty".to_string(),
            ));
        }
        let state = self.lock()?;
        let found = state
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .count();
        Ok(found == ids.len())
    }

    async fn add_user(&self, username: &str) -> Result<UserId, RepositoryError> {
        let mut state = self.lock()?;
        if state.users.iter().any(|u| u.username == username) {
            return Err(RepositoryError::Conflict(format!(
                "username '{username}' already exists"
            )));
        }
        let user = User {
            id: State::next_id(state.users.len()),
            username: username.to_string(),
            created_at: state.now(),
        };
        let id = user.id;
        state.users.push(user);
        Ok(id)
    }

    async fn chat_exists(&self, name: &str) -> Result<bool, RepositoryError> {
        let state = self.lock()?;
        Ok(state.chats.iter().any(|c| c.name == name))
    }

    async fn create_chat(
        &self,
        name: &str,
        member_ids: &[UserId],
    ) -> Result<ChatId, RepositoryError> {
        let mut state = self.lock()?;

        // Everything is checked before the chat is pushed, so a failure
        // leaves no trace.
        if state.chats.iter().any(|c| c.name == name) {
            return Err(RepositoryError::Conflict(format!(
                "chat '{name}' already exists"
            )));
        }
        for (i, id) in member_ids.iter().enumerate() {
            if !state.users.iter().any(|u| u.id == *id) {
                return Err(RepositoryError::Query(format!(
                    "FOREIGN KEY constraint failed for user {id}"
                )));
            }
            if member_ids[..i].contains(id) {
                return Err(RepositoryError::Query(format!(
                    "duplicate membership for user {id}"
                )));
            }
        }

        let chat = StoredChat {
            id: State::next_id(state.chats.len()),
            name: name.to_string(),
            created_at: state.now(),
            members: member_ids.to_vec(),
        };
        let id = chat.id;
        state.chats.push(chat);
        Ok(id)
    }

    async fn user_in_chat(&self, user_id: UserId, chat_id: ChatId) -> Result<bool, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .chats
            .iter()
            .any(|c| c.id == chat_id && c.members.contains(&user_id)))
    }

    async fn add_message(
        &self,
        author_id: UserId,
        chat_id: ChatId,
        text: &str,
    ) -> Result<MessageId, RepositoryError> {
        if !self.user_in_chat(author_id, chat_id).await.unwrap_or(false) {
            return Err(RepositoryError::NotMember { author_id, chat_id });
        }
        let mut state = self.lock()?;
        let message = Message {
            id: State::next_id(state.messages.len()),
            chat_id,
            author_id,
            text: text.to_string(),
            created_at: state.now(),
        };
        let id = message.id;
        state.messages.push(message);
        Ok(id)
    }

    async fn messages_for_chat(&self, chat_id: ChatId) -> Result<Vec<Message>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect())
    }

    async fn chats_for_user(&self, user_id: UserId) -> Result<Vec<Chat>, RepositoryError> {
        let state = self.lock()?;
        let mut chats: Vec<Chat> = state
            .chats
            .iter()
            .filter(|c| c.members.contains(&user_id))
            .map(|c| Chat {
                id: c.id,
                name: c.name.clone(),
                created_at: c.created_at,
                user_ids: c.members.clone(),
            })
            .collect();

        let mut recency = HashMap::with_capacity(chats.len());
        for message in &state.messages {
            // Messages are stored in id order, so the last write wins.
            recency.insert(message.chat_id, message.created_at);
        }
        order_by_recency(&mut chats, &recency);
        Ok(chats)
    }
}
