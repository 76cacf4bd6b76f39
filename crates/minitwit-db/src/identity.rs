use std::collections::HashMap;

use minitwit_types::models::{User, UserId};
use minitwit_types::validate::{USERNAME_TAKEN, validate_registration};
use rusqlite::{Connection, ErrorCode, OptionalExtension};
use tracing::{debug, info};

use crate::models::UserRow;
use crate::password::{hash_password, verify_password};
use crate::{Database, StoreError};

const LOOKUP_CHUNK: usize = 500;

impl Database {
    /// `None` when no user has this name.
    pub fn resolve_user(&self, username: &str) -> Result<Option<UserId>, StoreError> {
        debug!("Resolving user {}", username);
        self.with_conn(|conn| query_user_id(conn, username))
    }

    /// Like [`Database::resolve_user`], with a missing user as `NotFound`.
    pub fn require_user(&self, username: &str) -> Result<UserId, StoreError> {
        self.resolve_user(username)?
            .ok_or_else(|| StoreError::not_found(format!("User not found: {}", username)))
    }

    pub fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        self.with_conn(|conn| {
            let row = query_user_row(conn, id)?;
            Ok(row.map(|r| User {
                id: r.user_id,
                username: r.username,
                email: r.email,
            }))
        })
    }

    pub fn username_of(&self, id: UserId) -> Result<Option<String>, StoreError> {
        self.with_conn(|conn| {
            let name = conn
                .query_row("SELECT username FROM users WHERE user_id = ?1", [id], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(name)
        })
    }

    /// Batch-resolve ids to usernames. Unknown ids are absent from the map.
    pub fn usernames_for(&self, ids: &[UserId]) -> Result<HashMap<UserId, String>, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        self.with_conn(|conn| {
            let mut names = HashMap::with_capacity(ids.len());

            // Stay well under SQLite's bound-parameter limit.
            for chunk in ids.chunks(LOOKUP_CHUNK) {
                let placeholders: Vec<String> =
                    (1..=chunk.len()).map(|i| format!("?{}", i)).collect();
                let sql = format!(
                    "SELECT user_id, username FROM users WHERE user_id IN ({})",
                    placeholders.join(", ")
                );

                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(rusqlite::params_from_iter(chunk), |row| {
                    Ok((row.get::<_, UserId>(0)?, row.get::<_, String>(1)?))
                })?;
                for row in rows {
                    let (id, name) = row?;
                    names.insert(id, name);
                }
            }

            Ok(names)
        })
    }

    /// Create a user. Rules are checked in a fixed order and the first
    /// failure is returned; on any failure no row is written.
    pub fn register_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserId, StoreError> {
        validate_registration(username, email, password).map_err(StoreError::validation)?;

        let pw_hash = hash_password(password)?;

        let id = self.with_tx(|conn| {
            if query_user_id(conn, username)?.is_some() {
                return Err(StoreError::Conflict(USERNAME_TAKEN.into()));
            }

            match conn.execute(
                "INSERT INTO users (username, email, pw_hash) VALUES (?1, ?2, ?3)",
                (username, email, &pw_hash),
            ) {
                Ok(_) => Ok(conn.last_insert_rowid()),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation =>
                {
                    Err(StoreError::Conflict(USERNAME_TAKEN.into()))
                }
                Err(e) => Err(e.into()),
            }
        })?;

        info!("Registered user {} ({})", username, id);
        Ok(id)
    }

    /// `Some(id)` only when the user exists and the password matches.
    pub fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserId>, StoreError> {
        let row = self.with_conn(|conn| query_user_row_by_name(conn, username))?;

        Ok(row
            .filter(|r| verify_password(password, &r.pw_hash))
            .map(|r| r.user_id))
    }
}

pub(crate) fn query_user_id(conn: &Connection, username: &str) -> Result<Option<UserId>, StoreError> {
    let id = conn
        .query_row("SELECT user_id FROM users WHERE username = ?1", [username], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(id)
}

pub(crate) fn user_exists(conn: &Connection, id: UserId) -> Result<bool, StoreError> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM users WHERE user_id = ?1", [id], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

fn query_user_row(conn: &Connection, id: UserId) -> Result<Option<UserRow>, StoreError> {
    let mut stmt =
        conn.prepare("SELECT user_id, username, email, pw_hash FROM users WHERE user_id = ?1")?;
    let row = stmt.query_row([id], map_user_row).optional()?;
    Ok(row)
}

fn query_user_row_by_name(conn: &Connection, username: &str) -> Result<Option<UserRow>, StoreError> {
    let mut stmt =
        conn.prepare("SELECT user_id, username, email, pw_hash FROM users WHERE username = ?1")?;
    let row = stmt.query_row([username], map_user_row).optional()?;
    Ok(row)
}

fn map_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        user_id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        pw_hash: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::db;
    use minitwit_types::validate::{EMPTY_PASSWORD, EMPTY_USERNAME, INVALID_EMAIL};

    fn user_count(db: &Database) -> i64 {
        db.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?))
            .unwrap()
    }

    #[test]
    fn register_then_resolve() {
        let db = db();
        let id = db.register_user("ann", "a@x.com", "p").unwrap();

        assert_eq!(db.resolve_user("ann").unwrap(), Some(id));
        assert_eq!(db.resolve_user("nobody").unwrap(), None);
        assert_eq!(db.username_of(id).unwrap().as_deref(), Some("ann"));

        let user = db.get_user(id).unwrap().unwrap();
        assert_eq!(user.email, "a@x.com");
    }

    #[test]
    fn duplicate_username_is_a_conflict() {
        let db = db();
        db.register_user("ann", "a@x.com", "p").unwrap();

        let err = db.register_user("ann", "other@x.com", "q").unwrap_err();
        assert!(matches!(err, StoreError::Conflict(ref msg) if msg == USERNAME_TAKEN));
        assert_eq!(user_count(&db), 1);
    }

    #[test]
    fn validation_failures_write_nothing() {
        let db = db();

        let cases = [
            ("", "a@x.com", "p", EMPTY_USERNAME),
            ("ann", "ax.com", "p", INVALID_EMAIL),
            ("ann", "a@x.com", "", EMPTY_PASSWORD),
        ];
        for (name, email, pwd, expected) in cases {
            let err = db.register_user(name, email, pwd).unwrap_err();
            assert!(matches!(err, StoreError::Validation(ref msg) if msg == expected));
        }
        assert_eq!(user_count(&db), 0);
    }

    #[test]
    fn validation_runs_before_uniqueness() {
        let db = db();
        db.register_user("ann", "a@x.com", "p").unwrap();

        let err = db.register_user("ann", "a@x.com", "").unwrap_err();
        assert!(matches!(err, StoreError::Validation(ref msg) if msg == EMPTY_PASSWORD));
    }

    #[test]
    fn concurrent_registrations_create_one_user() {
        let db = std::sync::Arc::new(db());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let db = db.clone();
                std::thread::spawn(move || db.register_user("ann", "a@x.com", "p").is_ok())
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(user_count(&db), 1);
    }

    #[test]
    fn credentials_are_hashed_and_verifiable() {
        let db = db();
        let id = db.register_user("ann", "a@x.com", "secret").unwrap();

        let stored: String = db
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT pw_hash FROM users WHERE user_id = ?1", [id], |r| {
                    r.get(0)
                })?)
            })
            .unwrap();
        assert_ne!(stored, "secret");

        assert_eq!(db.verify_credentials("ann", "secret").unwrap(), Some(id));
        assert_eq!(db.verify_credentials("ann", "wrong").unwrap(), None);
        assert_eq!(db.verify_credentials("bob", "secret").unwrap(), None);
    }

    #[test]
    fn batch_username_lookup_skips_unknown_ids() {
        let db = db();
        let ann = db.register_user("ann", "a@x.com", "p").unwrap();
        let bob = db.register_user("bob", "b@x.com", "p").unwrap();

        let names = db.usernames_for(&[ann, bob, 999]).unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names[&ann], "ann");
        assert_eq!(names[&bob], "bob");
    }
}
