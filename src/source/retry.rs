//! Exponential backoff retry with a hard per-call deadline.
//!
//! Every attempt is bounded by `call_timeout`, so a stalled request cannot hold
//! up the poll loop. Transient failures (including deadline misses) are retried
//! after `initial_delay * multiplier^n`, capped at `max_delay`. Permanent
//! failures are returned immediately.
//!
//! Sleeping uses `tokio::time`, so tests can run against paused time.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use super::error::{FetchError, FetchErrorKind};

/// Configuration for exponential backoff retry.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial attempt).
    pub max_retries: u32,

    /// Initial delay before the first retry.
    pub initial_delay: Duration,

    /// Maximum delay between retries (cap for exponential growth).
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (typically 2.0).
    pub backoff_multiplier: f64,

    /// Deadline for each individual attempt.
    pub call_timeout: Duration,
}

impl RetryConfig {
    /// Default retry configuration for data source calls.
    ///
    /// - 3 retries with 3s, 6s, 12s delays
    /// - 30s per attempt
    pub const DEFAULT: Self = Self {
        max_retries: 3,
        initial_delay: Duration::from_secs(3),
        max_delay: Duration::from_secs(30),
        backoff_multiplier: 2.0,
        call_timeout: Duration::from_secs(30),
    };

    /// Creates a new retry configuration.
    pub fn new(
        max_retries: u32,
        initial_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f64,
        call_timeout: Duration,
    ) -> Self {
        Self {
            max_retries,
            initial_delay,
            max_delay,
            backoff_multiplier,
            call_timeout,
        }
    }

    /// Computes the delay for the given retry attempt (0-indexed).
    ///
    /// The delay grows exponentially: `initial_delay * backoff_multiplier^attempt`,
    /// capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let multiplier = self.backoff_multiplier.powi(attempt as i32);
        let delay_secs = self.initial_delay.as_secs_f64() * multiplier;
        let capped_secs = delay_secs.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped_secs)
    }

    /// Returns an iterator over all retry delays.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_retries).map(|attempt| self.delay_for_attempt(attempt))
    }

    /// Upper bound on wall time for one call including all retries.
    pub fn worst_case(&self) -> Duration {
        let attempts = self.max_retries + 1;
        self.delays().sum::<Duration>() + self.call_timeout * attempts
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Retry policy for controlling retry behavior at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Retry transient errors with exponential backoff.
    #[default]
    RetryTransient,

    /// Do not retry - return errors immediately.
    NoRetry,
}

/// Result of a retried operation.
#[derive(Debug)]
pub enum RetryResult<T> {
    /// The operation succeeded.
    Success(T),

    /// A transient error occurred after exhausting all retries.
    ExhaustedRetries {
        /// The last error encountered.
        last_error: FetchError,
        /// Number of attempts made (including the initial attempt).
        attempts: u32,
    },

    /// A permanent error occurred (not retriable).
    PermanentError(FetchError),
}

impl<T> RetryResult<T> {
    /// Converts to a Result, treating exhausted retries and permanent errors as Err.
    pub fn into_result(self) -> Result<T, FetchError> {
        match self {
            RetryResult::Success(v) => Ok(v),
            RetryResult::ExhaustedRetries { last_error, .. } => Err(last_error),
            RetryResult::PermanentError(e) => Err(e),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RetryResult::Success(_))
    }
}

/// Executes an async operation with a per-attempt deadline and retry logic.
///
/// # Arguments
///
/// * `config` - Retry configuration (delays, max attempts, deadline)
/// * `policy` - Whether to actually retry or return immediately
/// * `operation` - The async operation to execute. Called repeatedly until
///   success, permanent error, or max retries exhausted.
pub async fn retry_with_backoff<T, F, Fut>(
    config: RetryConfig,
    policy: RetryPolicy,
    mut operation: F,
) -> RetryResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0;
    let max_attempts = if policy == RetryPolicy::NoRetry {
        1
    } else {
        config.max_retries + 1 // Include initial attempt
    };

    loop {
        let outcome = match tokio::time::timeout(config.call_timeout, operation()).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::timed_out(config.call_timeout)),
        };

        match outcome {
            Ok(value) => return RetryResult::Success(value),
            Err(e) => {
                attempt += 1;

                match e.kind {
                    FetchErrorKind::Permanent => return RetryResult::PermanentError(e),
                    FetchErrorKind::Transient => {
                        if attempt >= max_attempts {
                            return RetryResult::ExhaustedRetries {
                                last_error: e,
                                attempts: attempt,
                            };
                        }

                        let delay = config.delay_for_attempt(attempt - 1);
                        debug!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Transient fetch failure, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }
}
