use minitwit_types::models::UserId;
use rusqlite::OptionalExtension;
use tracing::{debug, info};

use crate::identity::user_exists;
use crate::{Database, StoreError};

impl Database {
    /// Add the edge `follower -> followee`. Following twice is not an error
    /// and leaves a single edge.
    pub fn follow(&self, follower: UserId, followee: UserId) -> Result<(), StoreError> {
        self.with_tx(|conn| {
            for id in [follower, followee] {
                if !user_exists(conn, id)? {
                    return Err(StoreError::not_found(format!("User not found: {}", id)));
                }
            }

            let inserted = conn.execute(
                "INSERT OR IGNORE INTO followers (who_id, whom_id) VALUES (?1, ?2)",
                [follower, followee],
            )?;

            if inserted > 0 {
                info!("User {} now follows {}", follower, followee);
            } else {
                debug!("User {} already follows {}", follower, followee);
            }
            Ok(())
        })
    }

    /// Remove the edge if present.
    pub fn unfollow(&self, follower: UserId, followee: UserId) -> Result<(), StoreError> {
        self.with_tx(|conn| {
            let removed = conn.execute(
                "DELETE FROM followers WHERE who_id = ?1 AND whom_id = ?2",
                [follower, followee],
            )?;

            if removed > 0 {
                info!("User {} unfollowed {}", follower, followee);
            }
            Ok(())
        })
    }

    pub fn is_following(&self, follower: UserId, followee: UserId) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM followers WHERE who_id = ?1 AND whom_id = ?2",
                    [follower, followee],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// Usernames `user` follows, oldest edge first.
    pub fn list_followees(&self, user: UserId, limit: u32) -> Result<Vec<String>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.username
                 FROM followers f
                 JOIN users u ON u.user_id = f.whom_id
                 WHERE f.who_id = ?1
                 ORDER BY f.id ASC
                 LIMIT ?2",
            )?;

            let names = stmt
                .query_map(rusqlite::params![user, limit], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;

            Ok(names)
        })
    }
}
