//! Transitions for the play-session state machine.
//!
//! Pure functions from the current state and an input to the next state plus
//! whatever the transition emits. Time is passed in explicitly.
//!
//! ```text
//! Idle   --battle-->         Active   (emits Started)
//! Active --battle-->         Active   (emits Continued)
//! Active --idle >= timeout--> Idle    (emits summary)
//! Active --shutdown-->       Idle     (emits summary)
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::BattleEvent;

use super::state::{ActiveSession, SessionState};
use super::summary::{EndReason, SessionProgress, SessionSummary};

/// What recording a battle did to the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionUpdate {
    /// The battle opened a new session.
    Started { progress: SessionProgress },

    /// The battle was added to the running session.
    Continued { progress: SessionProgress },
}

impl SessionUpdate {
    pub fn progress(&self) -> &SessionProgress {
        match self {
            SessionUpdate::Started { progress } | SessionUpdate::Continued { progress } => {
                progress
            }
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, SessionUpdate::Started { .. })
    }
}

/// Records a battle, opening a session if none is running.
pub fn on_battle(
    state: SessionState,
    event: BattleEvent,
    now: DateTime<Utc>,
) -> (SessionState, SessionUpdate) {
    match state {
        SessionState::Idle => {
            let session = ActiveSession::begin(event, now);
            let update = SessionUpdate::Started {
                progress: session.progress(),
            };
            (SessionState::Active(session), update)
        }
        SessionState::Active(mut session) => {
            session.record(event, now);
            let update = SessionUpdate::Continued {
                progress: session.progress(),
            };
            (SessionState::Active(session), update)
        }
    }
}

/// Closes the session if it has been idle for at least `timeout`.
///
/// Evaluated on a fixed tick, so a session closes no earlier than `timeout`
/// after its last event and no later than `timeout` plus one tick.
pub fn on_idle_check(
    state: SessionState,
    now: DateTime<Utc>,
    timeout: Duration,
) -> (SessionState, Option<SessionSummary>) {
    match state {
        SessionState::Active(session) if session.idle_for(now) >= timeout => {
            let summary = SessionSummary::close(session, now, EndReason::IdleTimeout);
            (SessionState::Idle, Some(summary))
        }
        other => (other, None),
    }
}

/// Closes any running session unconditionally.
pub fn on_shutdown(state: SessionState, now: DateTime<Utc>) -> (SessionState, Option<SessionSummary>) {
    match state {
        SessionState::Active(session) => {
            let summary = SessionSummary::close(session, now, EndReason::Shutdown);
            (SessionState::Idle, Some(summary))
        }
        SessionState::Idle => (SessionState::Idle, None),
    }
}
