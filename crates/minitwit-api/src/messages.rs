use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use tracing::{debug, info};

use minitwit_types::api::{FeedEntry, FlagRequest, LimitQuery, PostMessageRequest};
use minitwit_types::models::MessageId;

use crate::error::ApiError;
use crate::latest::SessionToken;
use crate::state::{AppState, blocking};
use crate::timeline;

/// Page size for the feed endpoints. A query string that does not
/// deserialize (a repeated count, say) gets the default like any other bad value.
pub(crate) fn page_limit(query: Result<Query<LimitQuery>, QueryRejection>) -> u32 {
    match query {
        Ok(Query(q)) => q.limit(),
        Err(e) => {
            debug!("Ignoring query string: {}", e);
            LimitQuery::default().limit()
        }
    }
}

/// GET /api/msgs
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(session): Extension<SessionToken>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<Json<Vec<FeedEntry>>, ApiError> {
    let latest = state.tracker.current(&session).await;
    info!(latest, "msgs: getting public messages");

    let limit = page_limit(query);
    let feed = blocking(&state, move |db| timeline::global_feed(db, limit)).await?;
    Ok(Json(feed))
}

/// GET /api/msgs/{username}
///
/// An unknown username is a 400 here, unlike the write endpoints.
pub async fn get_user_messages(
    State(state): State<AppState>,
    Extension(session): Extension<SessionToken>,
    Path(username): Path<String>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<Json<Vec<FeedEntry>>, ApiError> {
    let latest = state.tracker.current(&session).await;
    info!(latest, "msgs: getting messages by {}", username);

    let limit = page_limit(query);
    let name = username.clone();
    let feed = blocking(&state, move |db| timeline::user_feed(db, &name, limit))
        .await?
        .ok_or_else(|| ApiError::bad_request(format!("Unknown user: {}", username)))?;
    Ok(Json(feed))
}

/// POST /api/msgs/{username}
pub async fn post_message(
    State(state): State<AppState>,
    Extension(session): Extension<SessionToken>,
    Path(username): Path<String>,
    payload: Result<Json<PostMessageRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let latest = state.tracker.current(&session).await;
    info!(latest, "msgs: posting message as {}", username);

    let Json(req) = payload?;
    blocking(&state, move |db| {
        let author = db.require_user(&username)?;
        db.post_message(author, &req.content)
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/flag/{message_id}
pub async fn flag_message(
    State(state): State<AppState>,
    Extension(session): Extension<SessionToken>,
    Path(message_id): Path<MessageId>,
    payload: Result<Json<FlagRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let latest = state.tracker.current(&session).await;
    info!(latest, "msgs: flagging message {}", message_id);

    let Json(req) = payload?;
    blocking(&state, move |db| db.set_flagged(message_id, req.flagged)).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/timeline/{username}
pub async fn get_timeline(
    State(state): State<AppState>,
    Extension(session): Extension<SessionToken>,
    Path(username): Path<String>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<Json<Vec<FeedEntry>>, ApiError> {
    let latest = state.tracker.current(&session).await;
    info!(latest, "timeline: getting home timeline of {}", username);

    let limit = page_limit(query);
    let feed = blocking(&state, move |db| timeline::home_feed(db, &username, limit)).await?;
    Ok(Json(feed))
}
