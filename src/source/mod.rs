//! Access to the external squadron and leaderboard data.
//!
//! [`DataSource`] is the seam between the monitor and the outside world. The
//! production implementation is [`HttpSource`]; [`RetryingSource`] wraps any
//! source with per-call deadlines and exponential backoff so callers above it
//! never block indefinitely.

pub mod error;
pub mod http;
pub mod retry;

use std::future::Future;
use std::sync::Arc;

pub use error::{FetchError, FetchErrorKind};
pub use http::HttpSource;
pub use retry::{RetryConfig, RetryPolicy, RetryResult, retry_with_backoff};

use crate::types::{LeaderboardPage, PageNumber, Player, Snapshot, SortKey};

/// Reads squadron statistics, roster and leaderboard pages.
pub trait DataSource: Send + Sync {
    /// The squadron's current cumulative statistics.
    fn fetch_snapshot(&self) -> impl Future<Output = Result<Snapshot, FetchError>> + Send;

    /// The squadron's member list as published by the source, unvalidated.
    fn fetch_players(&self) -> impl Future<Output = Result<Vec<Player>, FetchError>> + Send;

    /// One page of the leaderboard ordered by `sort`.
    fn fetch_leaderboard_page(
        &self,
        page: PageNumber,
        sort: &SortKey,
    ) -> impl Future<Output = Result<LeaderboardPage, FetchError>> + Send;
}

impl<S: DataSource> DataSource for Arc<S> {
    fn fetch_snapshot(&self) -> impl Future<Output = Result<Snapshot, FetchError>> + Send {
        (**self).fetch_snapshot()
    }

    fn fetch_players(&self) -> impl Future<Output = Result<Vec<Player>, FetchError>> + Send {
        (**self).fetch_players()
    }

    fn fetch_leaderboard_page(
        &self,
        page: PageNumber,
        sort: &SortKey,
    ) -> impl Future<Output = Result<LeaderboardPage, FetchError>> + Send {
        (**self).fetch_leaderboard_page(page, sort)
    }
}

/// Wraps a source so every call is deadline-bounded and retried on transient
/// failure.
#[derive(Debug, Clone)]
pub struct RetryingSource<S> {
    inner: S,
    config: RetryConfig,
    policy: RetryPolicy,
}

impl<S> RetryingSource<S> {
    pub fn new(inner: S, config: RetryConfig) -> Self {
        RetryingSource {
            inner,
            config,
            policy: RetryPolicy::RetryTransient,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl<S: DataSource> DataSource for RetryingSource<S> {
    async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError> {
        let inner = &self.inner;
        retry_with_backoff(self.config, self.policy, move || inner.fetch_snapshot())
            .await
            .into_result()
    }

    async fn fetch_players(&self) -> Result<Vec<Player>, FetchError> {
        let inner = &self.inner;
        retry_with_backoff(self.config, self.policy, move || inner.fetch_players())
            .await
            .into_result()
    }

    async fn fetch_leaderboard_page(
        &self,
        page: PageNumber,
        sort: &SortKey,
    ) -> Result<LeaderboardPage, FetchError> {
        let inner = &self.inner;
        retry_with_backoff(self.config, self.policy, move || {
            inner.fetch_leaderboard_page(page, sort)
        })
        .await
        .into_result()
    }
}
