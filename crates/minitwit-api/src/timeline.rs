//! Turns stored messages into feed records.
//!
//! [`render_feed`] is the only place a [`Message`] becomes a [`FeedEntry`],
//! so every feed has the same shape and hides the same messages.

use minitwit_db::{Database, StoreError};
use minitwit_types::api::{FeedEntry, FolloweesResponse};
use minitwit_types::models::{Message, UserId};
use tracing::warn;

/// Join messages to their authors' usernames, dropping hidden ones.
/// Input order is preserved.
pub fn render_feed(db: &Database, messages: Vec<Message>) -> Result<Vec<FeedEntry>, StoreError> {
    let visible: Vec<Message> = messages.into_iter().filter(Message::is_visible).collect();

    let mut authors: Vec<UserId> = visible.iter().map(|m| m.author_id).collect();
    authors.sort_unstable();
    authors.dedup();
    let names = db.usernames_for(&authors)?;

    let entries = visible
        .into_iter()
        .filter_map(|m| match names.get(&m.author_id) {
            Some(username) => Some(FeedEntry {
                username: username.clone(),
                content: m.content,
                timestamp: m.created_at,
            }),
            None => {
                warn!("Message {} has unknown author {}", m.id, m.author_id);
                None
            }
        })
        .collect();

    Ok(entries)
}

pub fn global_feed(db: &Database, limit: u32) -> Result<Vec<FeedEntry>, StoreError> {
    render_feed(db, db.list_global(limit)?)
}

/// `None` when the username does not resolve.
pub fn user_feed(
    db: &Database,
    username: &str,
    limit: u32,
) -> Result<Option<Vec<FeedEntry>>, StoreError> {
    let Some(id) = db.resolve_user(username)? else {
        return Ok(None);
    };
    render_feed(db, db.list_by_author(id, limit)?).map(Some)
}

/// The user's own messages and those of everyone they follow.
pub fn home_feed(db: &Database, username: &str, limit: u32) -> Result<Vec<FeedEntry>, StoreError> {
    let id = db.require_user(username)?;
    render_feed(db, db.list_home(id, limit)?)
}

/// Who `username` follows.
pub fn followees(db: &Database, username: &str, limit: u32) -> Result<FolloweesResponse, StoreError> {
    let id = db.require_user(username)?;
    Ok(FolloweesResponse {
        followees: db.list_followees(id, limit)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Database, UserId, UserId) {
        let db = Database::open_in_memory().unwrap();
        let ann = db.register_user("ann", "a@x.com", "p").unwrap();
        let bob = db.register_user("bob", "b@x.com", "p").unwrap();
        (db, ann, bob)
    }

    #[test]
    fn feed_entries_carry_author_names() {
        let (db, ann, bob) = setup();
        db.post_message(ann, "hello").unwrap();
        db.post_message(bob, "hey").unwrap();

        let feed = global_feed(&db, 10).unwrap();
        let pairs: Vec<_> = feed.iter().map(|e| (e.username.as_str(), e.content.as_str())).collect();
        assert_eq!(pairs, [("bob", "hey"), ("ann", "hello")]);
    }

    #[test]
    fn hidden_messages_are_dropped_even_if_passed_in() {
        let (db, ann, _) = setup();
        db.post_message(ann, "secret").unwrap();
        let mut msgs = db.list_global(10).unwrap();
        msgs[0].flagged = true;

        assert!(render_feed(&db, msgs).unwrap().is_empty());
    }

    #[test]
    fn user_feed_distinguishes_unknown_users() {
        let (db, ann, _) = setup();
        db.post_message(ann, "hello").unwrap();

        assert!(user_feed(&db, "nobody", 10).unwrap().is_none());
        assert!(user_feed(&db, "bob", 10).unwrap().unwrap().is_empty());
        assert_eq!(user_feed(&db, "ann", 10).unwrap().unwrap()[0].content, "hello");
    }

    #[test]
    fn followees_listing_round_trips_through_usernames() {
        let (db, ann, bob) = setup();
        db.follow(bob, ann).unwrap();

        assert_eq!(followees(&db, "bob", 100).unwrap().followees, ["ann"]);
        db.unfollow(bob, ann).unwrap();
        assert!(followees(&db, "bob", 100).unwrap().followees.is_empty());
        assert!(matches!(followees(&db, "nobody", 100), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn home_feed_needs_known_user() {
        let (db, ann, bob) = setup();
        db.follow(bob, ann).unwrap();
        db.post_message(ann, "hello").unwrap();

        assert_eq!(home_feed(&db, "bob", 10).unwrap()[0].username, "ann");
        assert!(matches!(home_feed(&db, "nobody", 10), Err(StoreError::NotFound(_))));
    }
}
