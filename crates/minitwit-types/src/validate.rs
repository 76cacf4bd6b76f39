//! Input rules shared by the store and the HTTP layer.
//!
//! Every check runs before any row is touched. Registration rules are
//! evaluated in a fixed order and the first failure wins.

use crate::api::FollowRequest;

pub const DEFAULT_LIMIT: u32 = 100;

pub const EMPTY_USERNAME: &str = "You have to enter a username";
pub const INVALID_EMAIL: &str = "You have to enter a valid email address";
pub const EMPTY_PASSWORD: &str = "You have to enter a password";
pub const USERNAME_TAKEN: &str = "The username is already taken";
pub const EMPTY_MESSAGE: &str = "You have to enter a message";
pub const NO_FOLLOW_ACTION: &str = "No 'follow' or 'unfollow' provided in request";

/// Stateless registration checks. Username uniqueness needs the store and is
/// checked there, after these pass.
pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), &'static str> {
    if username.is_empty() {
        return Err(EMPTY_USERNAME);
    }
    if !email.contains('@') {
        return Err(INVALID_EMAIL);
    }
    if password.is_empty() {
        return Err(EMPTY_PASSWORD);
    }
    Ok(())
}

pub fn validate_message(content: &str) -> Result<(), &'static str> {
    if content.is_empty() {
        return Err(EMPTY_MESSAGE);
    }
    Ok(())
}

/// Parse a caller-supplied count. Absent, unparsable, zero and negative
/// values all fall back to [`DEFAULT_LIMIT`].
pub fn parse_limit(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or(DEFAULT_LIMIT)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowAction<'a> {
    Follow(&'a str),
    Unfollow(&'a str),
}

impl FollowRequest {
    /// Exactly one of `follow` / `unfollow` must be non-empty.
    pub fn action(&self) -> Result<FollowAction<'_>, &'static str> {
        let follow = self.follow.as_deref().filter(|s| !s.is_empty());
        let unfollow = self.unfollow.as_deref().filter(|s| !s.is_empty());

        match (follow, unfollow) {
            (Some(name), None) => Ok(FollowAction::Follow(name)),
            (None, Some(name)) => Ok(FollowAction::Unfollow(name)),
            _ => Err(NO_FOLLOW_ACTION),
        }
    }
}
