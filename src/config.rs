//! Environment-driven configuration.
//!
//! | Variable | Default |
//! |---|---|
//! | `SQUADRON_NAME` | required |
//! | `SQUADRON_SOURCE_URL` | required |
//! | `SQUADRON_NOTIFY_URL` | unset (notifications are logged) |
//! | `SQUADRON_POLL_INTERVAL_MINS` | 5 |
//! | `SQUADRON_IDLE_TIMEOUT_MINS` | 30 |
//! | `SQUADRON_IDLE_CHECK_SECS` | 60 |
//! | `SQUADRON_REQUEST_TIMEOUT_MS` | 30000 |
//! | `SQUADRON_MAX_RETRIES` | 3 |
//! | `SQUADRON_LOW_RATING_THRESHOLD` | 0 |
//! | `SQUADRON_LISTEN_ADDR` | 0.0.0.0:3000 |
//! | `SQUADRON_LEADERBOARD_MAX_PAGES` | 50 |
//! | `SQUADRON_INFER_FROM_RATING` | true |
//!
//! A missing required variable or an unparsable value is a [`ConfigError`],
//! the only error that stops the process.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use crate::diff::InferencePolicy;
use crate::leaderboard::LeaderboardConfig;
use crate::monitor::MonitorConfig;
use crate::monitor::config::{
    DEFAULT_IDLE_CHECK_SECS, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL_SECS,
};
use crate::source::RetryConfig;
use crate::types::TeamName;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the binary needs to start.
#[derive(Debug, Clone)]
pub struct Config {
    pub monitor: MonitorConfig,
    pub retry: RetryConfig,
    pub leaderboard: LeaderboardConfig,
    pub source_url: Url,
    pub notify_url: Option<Url>,
    pub listen_addr: SocketAddr,
    pub request_timeout: Duration,
    pub low_rating_threshold: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars { lookup };

        let team = vars.required("SQUADRON_NAME")?;
        let source_url = parse_url("SQUADRON_SOURCE_URL", &vars.required("SQUADRON_SOURCE_URL")?)?;
        let notify_url = vars
            .optional("SQUADRON_NOTIFY_URL")
            .map(|v| parse_url("SQUADRON_NOTIFY_URL", &v))
            .transpose()?;

        let poll_mins: u64 = vars.parsed("SQUADRON_POLL_INTERVAL_MINS", DEFAULT_POLL_INTERVAL_SECS / 60)?;
        let idle_mins: u64 = vars.parsed("SQUADRON_IDLE_TIMEOUT_MINS", DEFAULT_IDLE_TIMEOUT_SECS / 60)?;
        let idle_check_secs: u64 = vars.parsed("SQUADRON_IDLE_CHECK_SECS", DEFAULT_IDLE_CHECK_SECS)?;
        let timeout_ms: u64 = vars.parsed("SQUADRON_REQUEST_TIMEOUT_MS", 30_000)?;
        let max_retries: u32 = vars.parsed("SQUADRON_MAX_RETRIES", RetryConfig::DEFAULT.max_retries)?;
        let max_pages: u32 = vars.parsed(
            "SQUADRON_LEADERBOARD_MAX_PAGES",
            LeaderboardConfig::DEFAULT.max_pages,
        )?;
        let infer_from_rating: bool = vars.parsed("SQUADRON_INFER_FROM_RATING", true)?;

        for (name, value) in [
            ("SQUADRON_POLL_INTERVAL_MINS", poll_mins),
            ("SQUADRON_IDLE_TIMEOUT_MINS", idle_mins),
            ("SQUADRON_IDLE_CHECK_SECS", idle_check_secs),
            ("SQUADRON_REQUEST_TIMEOUT_MS", timeout_ms),
            ("SQUADRON_LEADERBOARD_MAX_PAGES", u64::from(max_pages)),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    name,
                    value: value.to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        }

        let request_timeout = Duration::from_millis(timeout_ms);

        let mut monitor = MonitorConfig::new(TeamName::new(team));
        monitor.poll_interval = Duration::from_secs(poll_mins * 60);
        monitor.idle_timeout = Duration::from_secs(idle_mins * 60);
        monitor.idle_check_interval = Duration::from_secs(idle_check_secs);
        monitor.inference = InferencePolicy {
            infer_from_rating_sign: infer_from_rating,
        };

        Ok(Config {
            monitor,
            retry: RetryConfig {
                max_retries,
                call_timeout: request_timeout,
                ..RetryConfig::DEFAULT
            },
            leaderboard: LeaderboardConfig::DEFAULT.with_max_pages(max_pages),
            source_url,
            notify_url,
            listen_addr: vars.parsed("SQUADRON_LISTEN_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            request_timeout,
            low_rating_threshold: vars.parsed("SQUADRON_LOW_RATING_THRESHOLD", 0)?,
        })
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    /// The trimmed value, treating blank as unset.
    fn optional(&self, name: &'static str) -> Option<String> {
        (self.lookup)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn parsed<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(name) {
            None => Ok(default),
            Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
                name,
                reason: e.to_string(),
                value,
            }),
        }
    }
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
