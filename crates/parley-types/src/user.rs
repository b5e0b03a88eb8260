//! User type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Auto-assigned user identifier.
pub type UserId = i64;

/// Maximum length of a username or chat name, in characters.
pub const MAX_NAME_LEN: usize = 32;

/// A registered user.
///
/// The username is the natural key: unique and never changed after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}
