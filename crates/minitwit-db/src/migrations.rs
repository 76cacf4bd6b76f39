use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            user_id     INTEGER PRIMARY KEY AUTOINCREMENT,
            username    TEXT NOT NULL UNIQUE,
            email       TEXT NOT NULL,
            pw_hash     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS followers (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            who_id      INTEGER NOT NULL REFERENCES users(user_id),
            whom_id     INTEGER NOT NULL REFERENCES users(user_id),
            UNIQUE(who_id, whom_id)
        );

        CREATE TABLE IF NOT EXISTS messages (
            message_id  INTEGER PRIMARY KEY AUTOINCREMENT,
            author_id   INTEGER NOT NULL REFERENCES users(user_id),
            text        TEXT NOT NULL,
            pub_date    INTEGER NOT NULL,
            flagged     INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_messages_feed
            ON messages(flagged, pub_date);

        CREATE INDEX IF NOT EXISTS idx_messages_author
            ON messages(author_id, pub_date);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
