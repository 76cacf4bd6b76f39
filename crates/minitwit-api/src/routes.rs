use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::state::AppState;
use crate::{follows, latest, messages, register};

/// All API routes. Every route except `/api/latest` records the caller's
/// `latest` parameter before the handler runs.
pub fn router(state: AppState) -> Router {
    let tracked = Router::new()
        .route("/api/register", post(register::register))
        .route("/api/login", post(register::login))
        .route("/api/msgs", get(messages::get_messages))
        .route(
            "/api/msgs/{username}",
            get(messages::get_user_messages).post(messages::post_message),
        )
        .route("/api/flag/{message_id}", put(messages::flag_message))
        .route(
            "/api/fllws/{username}",
            get(follows::get_follows).post(follows::post_follows),
        )
        .route("/api/timeline/{username}", get(messages::get_timeline))
        .layer(middleware::from_fn_with_state(state.clone(), latest::track_command));

    Router::new()
        .route("/api/latest", get(latest::get_latest))
        .merge(tracked)
        .with_state(state)
}
