//! SQLite chat store implementation.
//!
//! Implements `ChatStore` from `parley-core` using sqlx with split read/write
//! pools: raw queries, private Row structs, reads on the reader pool, writes
//! and the chat-creation transaction on the writer.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parley_core::recency::order_by_recency;
use parley_core::repository::store::ChatStore;
use parley_types::chat::{Chat, ChatId};
use parley_types::error::RepositoryError;
use parley_types::message::{Message, MessageId};
use parley_types::user::UserId;
use sqlx::sqlite::SqlitePool;
use sqlx::{QueryBuilder, Row, Sqlite};
use tokio::task::JoinSet;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ChatStore`.
#[derive(Clone)]
pub struct SqliteChatStore {
    pool: DatabasePool,
}

impl SqliteChatStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Member ids of a chat in the order they were registered.
    async fn member_ids(&self, chat_id: ChatId) -> Result<Vec<UserId>, RepositoryError> {
        let rows = sqlx::query("SELECT user_id FROM membership WHERE chat_id = ? ORDER BY rowid")
            .bind(chat_id)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter()
            .map(|row| row.try_get::<i64, _>("user_id").map_err(query_error))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ChatRow {
    id: i64,
    name: String,
    created_at: String,
}

impl ChatRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_chat(self, user_ids: Vec<UserId>) -> Result<Chat, RepositoryError> {
        Ok(Chat {
            id: self.id,
            name: self.name,
            created_at: parse_datetime(&self.created_at)?,
            user_ids,
        })
    }
}

struct MessageRow {
    id: i64,
    chat_id: i64,
    author_id: i64,
    text: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            author_id: row.try_get("author_id")?,
            text: row.try_get("text")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        Ok(Message {
            id: self.id,
            chat_id: self.chat_id,
            author_id: self.author_id,
            text: self.text,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn query_error(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Connection
        }
        other => RepositoryError::Query(other.to_string()),
    }
}

/// Map a UNIQUE violation to `Conflict`, anything else to `query_error`.
fn write_error(e: sqlx::Error, conflict: impl FnOnce() -> String) -> RepositoryError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            RepositoryError::Conflict(conflict())
        }
        other => query_error(other),
    }
}

/// Creation time of the last inserted message of a chat, if any.
async fn last_message_time(
    reader: &SqlitePool,
    chat_id: ChatId,
) -> Result<Option<DateTime<Utc>>, RepositoryError> {
    let created_at: Option<String> =
        sqlx::query_scalar("SELECT created_at FROM messages WHERE chat_id = ? ORDER BY id DESC LIMIT 1")
            .bind(chat_id)
            .fetch_optional(reader)
            .await
            .map_err(query_error)?;

    created_at.as_deref().map(parse_datetime).transpose()
}

/// Resolve every chat's recency concurrently, one task per chat.
///
/// Waits for all tasks. A lookup that fails (query error, bad timestamp,
/// panicked task) falls back to the chat's creation time.
async fn resolve_recency(reader: &SqlitePool, chats: &[Chat]) -> HashMap<ChatId, DateTime<Utc>> {
    let mut join_set = JoinSet::new();

    for chat in chats {
        let reader = reader.clone();
        let chat_id = chat.id;
        let fallback = chat.created_at;

        join_set.spawn(async move {
            let last = last_message_time(&reader, chat_id).await.ok().flatten();
            (chat_id, last.unwrap_or(fallback))
        });
    }

    let mut recency = HashMap::with_capacity(chats.len());
    while let Some(joined) = join_set.join_next().await {
        // Panicked tasks are left out; ordering then uses creation time.
        if let Ok((chat_id, at)) = joined {
            recency.insert(chat_id, at);
        }
    }
    recency
}

// ---------------------------------------------------------------------------
// ChatStore implementation
// ---------------------------------------------------------------------------

impl ChatStore for SqliteChatStore {
    async fn user_exists(&self, username: &str) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        Ok(row.is_some())
    }

    async fn users_exist_by_ids(&self, ids: &[UserId]) -> Result<bool, RepositoryError> {
        if ids.is_empty() {
            return Err(RepositoryError::InvalidArgument(
                "user id set must not be empty".to_string(),
            ));
        }

        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM users WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;

        Ok(count == ids.len() as i64)
    }

    async fn add_user(&self, username: &str) -> Result<UserId, RepositoryError> {
        let result = sqlx::query("INSERT INTO users (username, created_at) VALUES (?, ?)")
            .bind(username)
            .bind(format_datetime(&Utc::now()))
            .execute(&self.pool.writer)
            .await
            .map_err(|e| write_error(e, || format!("username '{username}' already exists")))?;

        Ok(result.last_insert_rowid())
    }

    async fn chat_exists(&self, name: &str) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT id FROM chats WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        Ok(row.is_some())
    }

    async fn create_chat(
        &self,
        name: &str,
        member_ids: &[UserId],
    ) -> Result<ChatId, RepositoryError> {
        // Any early return drops `tx`, which rolls the whole chat back.
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let chat_id = sqlx::query("INSERT INTO chats (name, created_at) VALUES (?, ?)")
            .bind(name)
            .bind(format_datetime(&Utc::now()))
            .execute(&mut *tx)
            .await
            .map_err(|e| write_error(e, || format!("chat '{name}' already exists")))?
            .last_insert_rowid();

        for member_id in member_ids {
            sqlx::query("INSERT INTO membership (user_id, chat_id) VALUES (?, ?)")
                .bind(*member_id)
                .bind(chat_id)
                .execute(&mut *tx)
                .await
                .map_err(query_error)?;
        }

        tx.commit().await.map_err(query_error)?;

        Ok(chat_id)
    }

    async fn user_in_chat(&self, user_id: UserId, chat_id: ChatId) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT user_id FROM membership WHERE user_id = ? AND chat_id = ?")
            .bind(user_id)
            .bind(chat_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        Ok(row.is_some())
    }

    async fn add_message(
        &self,
        author_id: UserId,
        chat_id: ChatId,
        text: &str,
    ) -> Result<MessageId, RepositoryError> {
        // A failed membership lookup is treated like a negative answer.
        if !self.user_in_chat(author_id, chat_id).await.unwrap_or(false) {
            return Err(RepositoryError::NotMember { author_id, chat_id });
        }

        let result = sqlx::query(
            "INSERT INTO messages (chat_id, author_id, text, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(chat_id)
        .bind(author_id)
        .bind(text)
        .bind(format_datetime(&Utc::now()))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(result.last_insert_rowid())
    }

    async fn messages_for_chat(&self, chat_id: ChatId) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, chat_id, author_id, text, created_at FROM messages WHERE chat_id = ? ORDER BY id ASC",
        )
        .bind(chat_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row = MessageRow::from_row(row).map_err(query_error)?;
            messages.push(msg_row.into_message()?);
        }

        Ok(messages)
    }

    async fn chats_for_user(&self, user_id: UserId) -> Result<Vec<Chat>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT chats.id, chats.name, chats.created_at FROM membership
               INNER JOIN chats ON membership.chat_id = chats.id
               WHERE membership.user_id = ?
               ORDER BY chats.id"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut chats = Vec::with_capacity(rows.len());
        for row in &rows {
            let chat_row = ChatRow::from_row(row).map_err(query_error)?;
            let user_ids = self.member_ids(chat_row.id).await?;
            chats.push(chat_row.into_chat(user_ids)?);
        }

        let recency = resolve_recency(&self.pool.reader, &chats).await;
        order_by_recency(&mut chats, &recency);

        Ok(chats)
    }
}
