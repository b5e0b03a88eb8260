//! ChatStore trait definition.

use parley_types::chat::{Chat, ChatId};
use parley_types::error::RepositoryError;
use parley_types::message::{Message, MessageId};
use parley_types::user::UserId;

/// Persistence contract for users, chats and messages.
///
/// Implementations live in parley-infra (`SqliteChatStore`) and in
/// [`super::memory::InMemoryChatStore`]. Uses native async fn in traits
/// (RPITIT, Rust 2024 edition).
///
/// Implementations hold no per-request state and never log; every failure is
/// returned to the caller.
pub trait ChatStore: Send + Sync {
    /// Whether a user with this username exists.
    fn user_exists(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Whether every id in `ids` belongs to an existing user.
    ///
    /// Answered by a single count compared against `ids.len()`, so `ids` must
    /// be free of duplicates (a duplicate produces a false negative). An
    /// empty slice is rejected with `RepositoryError::InvalidArgument`.
    fn users_exist_by_ids(
        &self,
        ids: &[UserId],
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Insert a user and return its new id.
    fn add_user(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<UserId, RepositoryError>> + Send;

    /// Whether a chat with this name exists.
    fn chat_exists(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Atomically insert a chat and one membership row per member.
    ///
    /// Either everything is persisted or nothing is. Name uniqueness and
    /// member existence are checked by the caller beforehand; a lost race on
    /// the name surfaces as `RepositoryError::Conflict`.
    fn create_chat(
        &self,
        name: &str,
        member_ids: &[UserId],
    ) -> impl std::future::Future<Output = Result<ChatId, RepositoryError>> + Send;

    /// Whether a membership row exists for exactly this pair.
    fn user_in_chat(
        &self,
        user_id: UserId,
        chat_id: ChatId,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Append a message. Fails with `RepositoryError::NotMember` when the
    /// author is not a member of the chat.
    fn add_message(
        &self,
        author_id: UserId,
        chat_id: ChatId,
        text: &str,
    ) -> impl std::future::Future<Output = Result<MessageId, RepositoryError>> + Send;

    /// Messages of a chat in insertion order. Unknown chats yield an empty vec.
    fn messages_for_chat(
        &self,
        chat_id: ChatId,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;

    /// Chats the user belongs to, oldest activity first.
    ///
    /// Activity is the creation time of the chat's last message, or the chat's
    /// own creation time when it has none. Failing to resolve one chat's
    /// activity falls back to its creation time instead of failing the list.
    fn chats_for_user(
        &self,
        user_id: UserId,
    ) -> impl std::future::Future<Output = Result<Vec<Chat>, RepositoryError>> + Send;
}
