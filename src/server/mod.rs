//! HTTP server for squadron-watch.
//!
//! This module exposes the monitor's state and the on-demand queries:
//! - Session state as last published by the monitor
//! - Leaderboard rank of the monitored (or any) squadron
//! - Roster views
//! - Health checks for liveness probes
//!
//! # Endpoints
//!
//! - `GET /health` - Returns 200 if the server is running
//! - `GET /api/v1/session` - Returns the monitor's [`SessionView`] as JSON
//! - `GET /api/v1/rank` - Rank of the monitored squadron
//! - `GET /api/v1/rank/{team}` - Rank of any squadron
//! - `GET /api/v1/roster?top=N` - Highest-rated members
//! - `GET /api/v1/roster/low-rating` - Members below the rating threshold
//! - `GET /api/v1/roster/members/{name}` - One member, fuzzy-matched

use std::sync::Arc;

use tokio::sync::watch;

pub mod error;
pub mod health;
pub mod rank;
pub mod roster;
pub mod session;

pub use error::ApiError;
pub use health::health_handler;
pub use rank::{own_rank_handler, team_rank_handler};
pub use roster::{low_rating_handler, member_handler, roster_handler};
pub use session::session_handler;

use crate::leaderboard::RankResolver;
use crate::monitor::SessionView;
use crate::roster::NormalizedMatcher;
use crate::source::DataSource;
use crate::types::TeamName;

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor. Nothing here
/// is written by handlers: session state arrives through a `watch` channel
/// owned by the monitor, and rank queries hold no state between calls.
pub struct AppState<S> {
    inner: Arc<AppStateInner<S>>,
}

struct AppStateInner<S> {
    team: TeamName,

    /// Source used for roster fetches.
    source: S,

    resolver: RankResolver<S>,

    session: watch::Receiver<SessionView>,

    low_rating_threshold: i64,

    matcher: NormalizedMatcher,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        AppState {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: DataSource + Clone> AppState<S> {
    /// Creates the shared state.
    ///
    /// # Arguments
    ///
    /// * `team` - The monitored squadron
    /// * `source` - Data source for rank and roster queries
    /// * `resolver_config` - Leaderboard scan settings
    /// * `session` - Feed of the monitor's state
    /// * `low_rating_threshold` - Default threshold for the low-rating view
    pub fn new(
        team: TeamName,
        source: S,
        resolver_config: crate::leaderboard::LeaderboardConfig,
        session: watch::Receiver<SessionView>,
        low_rating_threshold: i64,
    ) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                team,
                resolver: RankResolver::new(source.clone(), resolver_config),
                source,
                session,
                low_rating_threshold,
                matcher: NormalizedMatcher,
            }),
        }
    }
}

impl<S> AppState<S> {
    pub fn team(&self) -> &TeamName {
        &self.inner.team
    }

    pub fn source(&self) -> &S {
        &self.inner.source
    }

    pub fn resolver(&self) -> &RankResolver<S> {
        &self.inner.resolver
    }

    /// A copy of the monitor's latest published state.
    pub fn session_view(&self) -> SessionView {
        self.inner.session.borrow().clone()
    }

    pub fn low_rating_threshold(&self) -> i64 {
        self.inner.low_rating_threshold
    }

    pub fn matcher(&self) -> &NormalizedMatcher {
        &self.inner.matcher
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router<S>(app_state: AppState<S>) -> axum::Router
where
    S: DataSource + 'static,
{
    use axum::routing::get;

    axum::Router::new()
        .route("/health", get(health_handler::<S>))
        .route("/api/v1/session", get(session_handler::<S>))
        .route("/api/v1/rank", get(own_rank_handler::<S>))
        .route("/api/v1/rank/{team}", get(team_rank_handler::<S>))
        .route("/api/v1/roster", get(roster_handler::<S>))
        .route("/api/v1/roster/low-rating", get(low_rating_handler::<S>))
        .route("/api/v1/roster/members/{name}", get(member_handler::<S>))
        .with_state(app_state)
}
