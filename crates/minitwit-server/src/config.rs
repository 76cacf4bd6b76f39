use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    /// Idle time after which a session's command checkpoint is dropped.
    pub session_ttl: Duration,
    pub sweep_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            db_path: env_or("MINITWIT_DB_PATH", "minitwit.db").into(),
            host: env_or("MINITWIT_HOST", "0.0.0.0"),
            port: parse_env("MINITWIT_PORT", 5001)?,
            session_ttl: Duration::from_secs(parse_env("MINITWIT_SESSION_TTL_SECS", 3600)?),
            sweep_interval: Duration::from_secs(parse_env("MINITWIT_SWEEP_INTERVAL_SECS", 60)?),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}
