use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error};

use minitwit_db::StoreError;
use minitwit_types::api::ErrorBody;

/// Error returned by every handler, rendered as `{"status", "error_msg"}`.
#[derive(Debug, Error)]
#[error("{status}: {error_msg}")]
pub struct ApiError {
    pub status: StatusCode,
    pub error_msg: String,
}

impl ApiError {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            error_msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(msg) | StoreError::Conflict(msg) => Self::bad_request(msg),
            StoreError::NotFound(msg) => Self::not_found(msg),
            StoreError::Storage(e) => {
                error!("Storage failure: {:#}", e);
                Self::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        debug!("Rejected request body: {}", e);
        Self::bad_request("Failed to parse JSON")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            status: self.status.as_u16(),
            error_msg: self.error_msg,
        };
        (self.status, Json(body)).into_response()
    }
}
