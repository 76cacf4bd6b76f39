use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type MessageId = i64;

/// Highest command sequence a session has reported, or this value when
/// nothing has been observed yet.
pub const NO_CHECKPOINT: i64 = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub author_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub flagged: bool,
}

impl Message {
    pub fn is_visible(&self) -> bool {
        !self.flagged
    }
}
