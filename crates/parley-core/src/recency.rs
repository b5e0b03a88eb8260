//! Ordering of a user's chats by most recent activity.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parley_types::chat::{Chat, ChatId};

/// Sort `chats` ascending by their resolved recency timestamp.
///
/// Chats missing from `recency` fall back to their creation time. The sort is
/// stable: chats with equal recency keep their incoming relative order.
pub fn order_by_recency(chats: &mut [Chat], recency: &HashMap<ChatId, DateTime<Utc>>) {
    chats.sort_by_key(|chat| recency.get(&chat.id).copied().unwrap_or(chat.created_at));
}
