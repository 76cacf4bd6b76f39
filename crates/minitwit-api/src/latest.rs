//! Per-session command checkpoints.
//!
//! Test harnesses tag each write with a `latest` sequence number and later
//! poll `GET /api/latest` to learn which commands this instance has seen.
//! The checkpoint for a session only ever moves forward. Nothing here blocks
//! or rejects a request.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Json,
    extract::{Query, Request, State, rejection::QueryRejection},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use minitwit_types::api::{CommandQuery, LatestResponse};
use minitwit_types::models::NO_CHECKPOINT;

use crate::state::AppState;

pub const SESSION_COOKIE: &str = "minitwit_session";

/// Opaque client session identifier carried in [`SESSION_COOKIE`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    latest: i64,
    touched: Instant,
}

/// Keyed store of checkpoints. An entry is created on the first observation
/// for a session and dropped once it has been idle longer than the TTL.
#[derive(Clone)]
pub struct CommandTracker {
    sessions: Arc<RwLock<HashMap<SessionToken, Checkpoint>>>,
    ttl: Duration,
}

impl CommandTracker {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Record `sequence` for the session. `None` is a no-op and a value lower
    /// than the stored one never replaces it.
    pub async fn observe(&self, session: &SessionToken, sequence: Option<i64>) {
        let Some(sequence) = sequence else { return };

        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let entry = sessions.entry(session.clone()).or_insert(Checkpoint {
            latest: sequence,
            touched: now,
        });
        // An idle session that has not been swept yet starts over.
        entry.latest = if self.is_expired(entry) {
            sequence
        } else {
            entry.latest.max(sequence)
        };
        entry.touched = now;
    }

    /// Stored checkpoint, or [`NO_CHECKPOINT`] when none is live.
    pub async fn current(&self, session: &SessionToken) -> i64 {
        let sessions = self.sessions.read().await;
        sessions
            .get(session)
            .filter(|c| !self.is_expired(c))
            .map_or(NO_CHECKPOINT, |c| c.latest)
    }

    /// Drop expired sessions, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, c| !self.is_expired(c));
        before - sessions.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn is_expired(&self, c: &Checkpoint) -> bool {
        c.touched.elapsed() >= self.ttl
    }
}

/// Middleware for every API route except `/api/latest`: make sure the client
/// has a session, record its `latest` parameter, and expose the session to
/// handlers as a request extension.
pub async fn track_command(
    State(state): State<AppState>,
    jar: CookieJar,
    query: Result<Query<CommandQuery>, QueryRejection>,
    mut req: Request,
    next: Next,
) -> Response {
    let (jar, session) = match session_from(&jar) {
        Some(session) => (jar, session),
        None => {
            let session = SessionToken::generate();
            debug!("Issuing session {}", session.as_str());
            let cookie = Cookie::build((SESSION_COOKIE, session.as_str().to_owned()))
                .path("/")
                .http_only(true)
                .build();
            (jar.add(cookie), session)
        }
    };

    let sequence = query.map(|Query(q)| q.sequence()).unwrap_or_default();
    state.tracker.observe(&session, sequence).await;

    req.extensions_mut().insert(session);
    let response = next.run(req).await;

    (jar, response).into_response()
}

/// GET /api/latest
pub async fn get_latest(State(state): State<AppState>, jar: CookieJar) -> Json<LatestResponse> {
    let latest = match session_from(&jar) {
        Some(session) => state.tracker.current(&session).await,
        None => NO_CHECKPOINT,
    };
    info!(latest, "latest: reporting checkpoint");

    Json(LatestResponse { latest })
}

fn session_from(jar: &CookieJar) -> Option<SessionToken> {
    jar.get(SESSION_COOKIE)
        .map(|c| c.value())
        .filter(|v| !v.is_empty())
        .map(SessionToken::from)
}
