//! Message type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::ChatId;
use crate::user::UserId;

/// Auto-assigned message identifier. Monotonically increasing, so it doubles
/// as the insertion order.
pub type MessageId = i64;

/// A message posted to a chat. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    #[serde(rename = "chat")]
    pub chat_id: ChatId,
    #[serde(rename = "author")]
    pub author_id: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
