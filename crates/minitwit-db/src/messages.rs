use chrono::Utc;
use minitwit_types::models::{Message, MessageId, UserId};
use minitwit_types::validate::validate_message;
use rusqlite::{Connection, params};
use tracing::{debug, info};

use crate::identity::user_exists;
use crate::models::MessageRow;
use crate::{Database, StoreError};

const MESSAGE_COLUMNS: &str = "message_id, author_id, text, pub_date, flagged";

impl Database {
    /// Store a visible message. Its timestamp is never earlier than the
    /// newest stored one, so feed order follows write order.
    pub fn post_message(&self, author: UserId, content: &str) -> Result<MessageId, StoreError> {
        validate_message(content).map_err(StoreError::validation)?;

        let id = self.with_tx(|conn| {
            ensure_user(conn, author)?;

            let newest: i64 =
                conn.query_row("SELECT COALESCE(MAX(pub_date), 0) FROM messages", [], |row| {
                    row.get(0)
                })?;
            let pub_date = Utc::now().timestamp_millis().max(newest);

            conn.execute(
                "INSERT INTO messages (author_id, text, pub_date, flagged) VALUES (?1, ?2, ?3, 0)",
                params![author, content, pub_date],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        info!("User {} posted message {}", author, id);
        Ok(id)
    }

    /// Most recent visible messages from everyone, newest first.
    pub fn list_global(&self, limit: u32) -> Result<Vec<Message>, StoreError> {
        self.with_conn(|conn| {
            query_messages(
                conn,
                &format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages
                     WHERE flagged = 0
                     ORDER BY pub_date DESC, message_id DESC
                     LIMIT ?1"
                ),
                params![limit],
            )
        })
    }

    pub fn list_by_author(&self, author: UserId, limit: u32) -> Result<Vec<Message>, StoreError> {
        debug!("Listing messages by user {}", author);
        self.with_conn(|conn| {
            ensure_user(conn, author)?;
            query_messages(
                conn,
                &format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages
                     WHERE flagged = 0 AND author_id = ?1
                     ORDER BY pub_date DESC, message_id DESC
                     LIMIT ?2"
                ),
                params![author, limit],
            )
        })
    }

    /// The user's own messages plus those of everyone they follow.
    pub fn list_home(&self, user: UserId, limit: u32) -> Result<Vec<Message>, StoreError> {
        self.with_conn(|conn| {
            ensure_user(conn, user)?;
            query_messages(
                conn,
                &format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages
                     WHERE flagged = 0
                       AND (author_id = ?1
                            OR author_id IN (SELECT whom_id FROM followers WHERE who_id = ?1))
                     ORDER BY pub_date DESC, message_id DESC
                     LIMIT ?2"
                ),
                params![user, limit],
            )
        })
    }

    /// Hide or unhide a message. Hidden messages stay stored.
    pub fn set_flagged(&self, message: MessageId, flagged: bool) -> Result<(), StoreError> {
        let updated = self.with_tx(|conn| {
            Ok(conn.execute(
                "UPDATE messages SET flagged = ?1 WHERE message_id = ?2",
                params![flagged, message],
            )?)
        })?;

        if updated == 0 {
            return Err(StoreError::not_found(format!("Message not found: {}", message)));
        }
        info!("Message {} flagged={}", message, flagged);
        Ok(())
    }
}

fn ensure_user(conn: &Connection, id: UserId) -> Result<(), StoreError> {
    if user_exists(conn, id)? {
        Ok(())
    } else {
        Err(StoreError::not_found(format!("User not found: {}", id)))
    }
}

fn query_messages(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<Message>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, MessageRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows.into_iter().map(Message::from).collect())
}
