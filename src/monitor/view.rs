//! The read-only picture of the monitor published to other tasks.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::session::{SessionState, SessionSummary};
use crate::types::{Snapshot, TeamName};

/// What the monitor last saw. Published through a `watch` channel; readers
/// never block the monitor and always see a consistent copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub team: TeamName,
    pub session: SessionState,
    pub last_snapshot: Option<Snapshot>,
    pub last_polled_at: Option<DateTime<Utc>>,

    /// Whether the most recent poll reached the data source.
    pub source_reachable: bool,

    /// The most recently closed session.
    pub last_summary: Option<SessionSummary>,
}

impl SessionView {
    pub fn new(team: TeamName) -> Self {
        SessionView {
            team,
            session: SessionState::Idle,
            last_snapshot: None,
            last_polled_at: None,
            source_reachable: false,
            last_summary: None,
        }
    }
}
