//! Data source error types.
//!
//! Fetch failures are split into two kinds because only one of them is worth
//! retrying:
//!
//! - **Transient**: timeouts, connection failures, HTTP 429 and 5xx. Retried
//!   with backoff; if retries run out the caller treats it as a soft failure.
//! - **Permanent**: other HTTP 4xx responses and bodies that do not decode.
//!   Retrying would produce the same answer.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// The kind of fetch error, categorized for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Safe to retry with backoff.
    Transient,

    /// Requires a change on one side or the other; do not retry.
    Permanent,
}

impl FetchErrorKind {
    pub fn is_retriable(&self) -> bool {
        matches!(self, FetchErrorKind::Transient)
    }
}

/// A data source failure with categorization for retry decisions.
#[derive(Debug, Error)]
pub struct FetchError {
    pub kind: FetchErrorKind,

    /// The HTTP status code, if the request got that far.
    pub status_code: Option<u16>,

    pub message: String,

    /// The underlying HTTP client error, if any.
    #[source]
    pub source: Option<reqwest::Error>,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "fetch failed (HTTP {}): {}", code, self.message),
            None => write!(f, "fetch failed: {}", self.message),
        }
    }
}

impl FetchError {
    /// Creates a transient error without an HTTP source.
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Transient,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a permanent error without an HTTP source.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Permanent,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// A call that did not finish within its deadline.
    pub fn timed_out(after: Duration) -> Self {
        Self::transient(format!("no response within {} ms", after.as_millis()))
    }

    pub fn is_transient(&self) -> bool {
        self.kind.is_retriable()
    }

    /// Categorizes a non-success HTTP response.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            kind: kind_for_status(status),
            status_code: Some(status),
            message: body.into(),
            source: None,
        }
    }

    /// Categorizes a reqwest error.
    ///
    /// Timeouts and connection failures are transient. Errors carrying a status
    /// are categorized by status. Decode failures are permanent: the source
    /// answered, but not in a shape we understand.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        let status_code = err.status().map(|s| s.as_u16());
        let kind = match status_code {
            Some(code) => kind_for_status(code),
            None if err.is_decode() || err.is_builder() => FetchErrorKind::Permanent,
            None if err.is_timeout() || err.is_connect() || err.is_request() => {
                FetchErrorKind::Transient
            }
            None if is_network_error(&err.to_string()) => FetchErrorKind::Transient,
            None => FetchErrorKind::Permanent,
        };

        Self {
            kind,
            status_code,
            message: err.to_string(),
            source: Some(err),
        }
    }
}

fn kind_for_status(status: u16) -> FetchErrorKind {
    match status {
        429 => FetchErrorKind::Transient,
        408 => FetchErrorKind::Transient,
        code if (500..600).contains(&code) => FetchErrorKind::Transient,
        _ => FetchErrorKind::Permanent,
    }
}

/// Checks if an error message indicates a network-level error.
fn is_network_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("timeout")
        || message_lower.contains("connection")
        || message_lower.contains("network")
        || message_lower.contains("dns")
        || message_lower.contains("timed out")
}
