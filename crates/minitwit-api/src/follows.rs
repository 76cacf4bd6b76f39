use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use tracing::info;

use minitwit_types::api::{FollowRequest, FolloweesResponse, LimitQuery};
use minitwit_types::validate::FollowAction;

use crate::error::ApiError;
use crate::latest::SessionToken;
use crate::state::{AppState, blocking};
use crate::{messages, timeline};

/// GET /api/fllws/{username}: the users `username` follows.
pub async fn get_follows(
    State(state): State<AppState>,
    Extension(session): Extension<SessionToken>,
    Path(username): Path<String>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<Json<FolloweesResponse>, ApiError> {
    let latest = state.tracker.current(&session).await;
    info!(latest, "fllws: listing followees of {}", username);

    let limit = messages::page_limit(query);
    let body = blocking(&state, move |db| timeline::followees(db, &username, limit)).await?;
    Ok(Json(body))
}

/// POST /api/fllws/{username} with `{"follow": name}` or `{"unfollow": name}`.
pub async fn post_follows(
    State(state): State<AppState>,
    Extension(session): Extension<SessionToken>,
    Path(username): Path<String>,
    payload: Result<Json<FollowRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let latest = state.tracker.current(&session).await;
    info!(latest, "fllws: updating follows of {}", username);

    let Json(req) = payload?;
    let action = req.action().map_err(ApiError::bad_request)?;
    let (target, follow) = match action {
        FollowAction::Follow(name) => (name.to_owned(), true),
        FollowAction::Unfollow(name) => (name.to_owned(), false),
    };

    blocking(&state, move |db| {
        let who = db.require_user(&username)?;
        let whom = db.require_user(&target)?;
        if follow {
            db.follow(who, whom)
        } else {
            db.unfollow(who, whom)
        }
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
