//! Database row types. These map directly to SQLite rows and stay distinct
//! from the minitwit-types models so the schema can change independently.

use chrono::{DateTime, Utc};
use minitwit_types::models::{Message, MessageId, UserId};
use tracing::warn;

pub struct UserRow {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub pw_hash: String,
}

pub struct MessageRow {
    pub message_id: MessageId,
    pub author_id: UserId,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub pub_date: i64,
    pub flagged: bool,
}

impl MessageRow {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(MessageRow {
            message_id: row.get(0)?,
            author_id: row.get(1)?,
            text: row.get(2)?,
            pub_date: row.get(3)?,
            flagged: row.get(4)?,
        })
    }
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        let created_at = DateTime::<Utc>::from_timestamp_millis(row.pub_date).unwrap_or_else(|| {
            warn!("Corrupt pub_date {} on message {}", row.pub_date, row.message_id);
            DateTime::default()
        });

        Message {
            id: row.message_id,
            author_id: row.author_id,
            content: row.text,
            created_at,
            flagged: row.flagged,
        }
    }
}
