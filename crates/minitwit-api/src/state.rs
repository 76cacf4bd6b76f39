use std::sync::Arc;
use std::time::Duration;

use tracing::error;

use minitwit_db::{Database, StoreError};

use crate::error::ApiError;
use crate::latest::CommandTracker;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tracker: CommandTracker,
}

impl AppStateInner {
    pub fn new(db: Database, session_ttl: Duration) -> Self {
        Self {
            db,
            tracker: CommandTracker::new(session_ttl),
        }
    }
}

/// Run a database call off the async runtime.
pub async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::internal()
        })?
        .map_err(ApiError::from)
}
