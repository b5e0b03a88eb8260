use thiserror::Error;

use crate::chat::ChatId;
use crate::user::UserId;

/// Errors from store operations (used by the `ChatStore` trait in parley-core).
///
/// Absence is never an error here: existence checks answer `false` and list
/// queries answer an empty vector.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A UNIQUE constraint rejected the write (username or chat name race).
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("user {author_id} is not a member of chat {chat_id}")]
    NotMember { author_id: UserId, chat_id: ChatId },
}

/// Errors returned by the messenger service to its callers.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("user '{0}' already exists")]
    UserExists(String),

    #[error("chat '{0}' already exists")]
    ChatExists(String),

    #[error("nonexistent user")]
    UnknownUsers,

    #[error("user is not in the chat")]
    NotMember,

    #[error("request cancelled")]
    Cancelled,

    #[error("request timed out")]
    Timeout,

    #[error("storage error: {0}")]
    Storage(String),
}

impl ChatError {
    /// Whether the error describes a caller mistake rather than a server fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ChatError::InvalidInput(_)
                | ChatError::UserExists(_)
                | ChatError::ChatExists(_)
                | ChatError::UnknownUsers
                | ChatError::NotMember
        )
    }
}
