use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::UserId;
use crate::validate::parse_limit;

// -- Errors --

/// Body of every non-2xx API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: u16,
    pub error_msg: String,
}

// -- Command checkpoint --

#[derive(Debug, Default, Deserialize)]
pub struct CommandQuery {
    /// Kept as a string so a garbage value is ignored instead of rejecting the request.
    pub latest: Option<String>,
}

impl CommandQuery {
    /// The sequence number the caller wants remembered, if any.
    pub fn sequence(&self) -> Option<i64> {
        self.latest
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|seq| *seq >= 0)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LatestResponse {
    pub latest: i64,
}

// -- Listing --

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    #[serde(alias = "limit")]
    pub no: Option<String>,
}

impl LimitQuery {
    pub fn limit(&self) -> u32 {
        parse_limit(self.no.as_deref())
    }
}

// -- Auth --

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "password")]
    pub pwd: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default, alias = "password")]
    pub pwd: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: UserId,
    pub username: String,
}

// -- Messages --

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlagRequest {
    pub flagged: bool,
}

/// One row of any feed-shaped response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub username: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

// -- Follows --

#[derive(Debug, Default, Deserialize)]
pub struct FollowRequest {
    pub follow: Option<String>,
    pub unfollow: Option<String>,
}

/// Users the target follows. The wire key stays `followers` for existing clients.
#[derive(Debug, Serialize, Deserialize)]
pub struct FolloweesResponse {
    #[serde(rename = "followers")]
    pub followees: Vec<String>,
}
