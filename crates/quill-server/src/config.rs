use std::ops::RangeInclusive;
use std::path::PathBuf;

use anyhow::{Context, bail};

/// Secret used when `QUILL_SECRET_KEY` is unset. Fine for development only.
pub const PLACEHOLDER_SECRET: &str = "dev";

/// Accepted `QUILL_SESSION_DAYS`: at least a day, at most ten years.
pub const SESSION_DAYS: RangeInclusive<i64> = 1..=3650;

#[derive(Debug, Clone)]
pub struct Config {
    pub secret_key: String,
    pub database: PathBuf,
    pub host: String,
    pub port: u16,
    pub session_days: i64,
    pub testing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secret_key: PLACEHOLDER_SECRET.into(),
            database: PathBuf::from("quill.sqlite"),
            host: "0.0.0.0".into(),
            port: 5000,
            session_days: 30,
            testing: false,
        }
    }
}

impl Config {
    /// Defaults overridden by `QUILL_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let port = match std::env::var("QUILL_PORT") {
            Ok(raw) => raw.parse().with_context(|| format!("invalid QUILL_PORT: {raw}"))?,
            Err(_) => defaults.port,
        };
        let session_days = match std::env::var("QUILL_SESSION_DAYS") {
            Ok(raw) => parse_session_days(&raw)?,
            Err(_) => defaults.session_days,
        };

        Ok(Self {
            secret_key: std::env::var("QUILL_SECRET_KEY").unwrap_or(defaults.secret_key),
            database: std::env::var("QUILL_DATABASE")
                .map(PathBuf::from)
                .unwrap_or(defaults.database),
            host: std::env::var("QUILL_HOST").unwrap_or(defaults.host),
            port,
            session_days,
            testing: false,
        })
    }

    /// Session lifetime, rejecting values outside [`SESSION_DAYS`].
    pub fn session_lifetime(&self) -> anyhow::Result<chrono::Duration> {
        check_session_days(self.session_days)?;
        Ok(chrono::Duration::days(self.session_days))
    }

    pub fn uses_placeholder_secret(&self) -> bool {
        self.secret_key.is_empty() || self.secret_key == PLACEHOLDER_SECRET
    }
}

fn check_session_days(days: i64) -> anyhow::Result<i64> {
    if !SESSION_DAYS.contains(&days) {
        bail!(
            "QUILL_SESSION_DAYS={days} is outside {}..={}",
            SESSION_DAYS.start(),
            SESSION_DAYS.end()
        );
    }
    Ok(days)
}

fn parse_session_days(raw: &str) -> anyhow::Result<i64> {
    raw.parse()
        .map_err(anyhow::Error::from)
        .and_then(check_session_days)
        .with_context(|| format!("invalid QUILL_SESSION_DAYS: {raw}"))
}
