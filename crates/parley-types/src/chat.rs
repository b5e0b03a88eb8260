//! Chat type.
//!
//! A chat is created together with its full member list and the membership
//! never changes afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::UserId;

/// Auto-assigned chat identifier.
pub type ChatId = i64;

/// A named chat and its members.
///
/// `users` holds member ids in the order they were registered when the chat
/// was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "users")]
    pub user_ids: Vec<UserId>,
}
