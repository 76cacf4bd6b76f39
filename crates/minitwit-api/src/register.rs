use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::info;

use minitwit_types::api::{LoginRequest, LoginResponse, RegisterRequest};

use crate::error::ApiError;
use crate::latest::SessionToken;
use crate::state::{AppState, blocking};

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    Extension(session): Extension<SessionToken>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let latest = state.tracker.current(&session).await;
    info!(latest, "register: registering user");

    let Json(req) = payload?;
    blocking(&state, move |db| db.register_user(&req.username, &req.email, &req.pwd)).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<SessionToken>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let latest = state.tracker.current(&session).await;
    info!(latest, "login: checking credentials");

    let Json(req) = payload?;
    let username = req.username.clone();
    let user_id = blocking(&state, move |db| db.verify_credentials(&req.username, &req.pwd))
        .await?
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "Invalid username or password"))?;

    Ok(Json(LoginResponse { user_id, username }))
}
