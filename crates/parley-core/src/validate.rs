//! Request field validation.
//!
//! Usernames and chat names are identifiers: an ASCII letter followed by
//! ASCII letters, digits or underscores, at most [`MAX_NAME_LEN`] characters.

use parley_types::error::ChatError;
use parley_types::user::{MAX_NAME_LEN, UserId};

/// Validate a username or chat name. `field` names the input in the error.
pub fn validate_name(field: &str, value: &str) -> Result<(), ChatError> {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return Err(ChatError::InvalidInput(format!("{field} cannot be empty")));
    };
    if value.chars().count() > MAX_NAME_LEN {
        return Err(ChatError::InvalidInput(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    if !first.is_ascii_alphabetic() {
        return Err(ChatError::InvalidInput(format!(
            "{field} must start with a letter"
        )));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ChatError::InvalidInput(format!(
            "{field} may only contain letters, digits and underscores"
        )));
    }
    Ok(())
}

/// Validate a single numeric id taken from a request. Ids start at 1, so
/// zero is treated as a missing value.
pub fn validate_id(field: &str, id: i64) -> Result<(), ChatError> {
    if id < 1 {
        return Err(ChatError::InvalidInput(format!("{field} is required and must be positive")));
    }
    Ok(())
}

/// Validate the member list of a new chat: non-empty, positive, unique.
pub fn validate_members(member_ids: &[UserId]) -> Result<(), ChatError> {
    if member_ids.is_empty() {
        return Err(ChatError::InvalidInput(
            "a chat needs at least one user".to_string(),
        ));
    }
    for (i, id) in member_ids.iter().enumerate() {
        validate_id("user id", *id)?;
        if member_ids[..i].contains(id) {
            return Err(ChatError::InvalidInput(format!("user {id} listed twice")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["a", "alice", "Bob_2", "x_______", &"a".repeat(32)] {
            assert!(validate_name("username", name).is_ok(), "{name} should pass");
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", "1abc", "_abc", "has space", "dash-ed", "ümlaut", &"a".repeat(33)] {
            let err = validate_name("username", name).unwrap_err();
            assert!(matches!(err, ChatError::InvalidInput(_)), "{name} should fail");
        }
    }

    #[test]
    fn test_members_must_be_unique_and_present() {
        assert!(validate_members(&[1, 2, 3]).is_ok());
        assert!(validate_members(&[0]).is_err());
        assert!(validate_members(&[]).is_err());
        assert!(validate_members(&[1, 2, 1]).is_err());
        assert!(validate_members(&[1, -2]).is_err());
    }

    #[test]
    fn test_zero_and_negative_ids_rejected() {
        assert!(validate_id("chat", 1).is_ok());
        for id in [0, -1] {
            let err = validate_id("chat", id).unwrap_err();
            assert_eq!(err.to_string(), "invalid input: chat is required and must be positive");
        }
    }
}
