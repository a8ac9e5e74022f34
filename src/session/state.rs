//! Session state types.
//!
//! A session is either idle or active. Only the active variant carries data,
//! so there is no way to read counters from a session that is not running.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::BattleEvent;

use super::summary::{SessionProgress, win_rate_percent};

/// The state of the play-session machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// No session in progress.
    #[default]
    Idle,

    /// A session is in progress.
    Active(ActiveSession),
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active(_))
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        match self {
            SessionState::Active(session) => Some(session),
            SessionState::Idle => None,
        }
    }
}

/// Data for a running session.
///
/// INVARIANT: `events` is non-empty and the counters equal the sum of the
/// events' contributions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSession {
    pub started_at: DateTime<Utc>,

    /// The rating before the event that opened the session.
    pub starting_rating: i64,

    pub wins: i64,
    pub losses: i64,
    pub total_battles: i64,

    /// Events in the order they were observed.
    pub events: Vec<BattleEvent>,

    pub last_activity: DateTime<Utc>,
}

impl ActiveSession {
    /// Opens a session with `event` as its first entry.
    pub fn begin(event: BattleEvent, now: DateTime<Utc>) -> Self {
        let mut session = ActiveSession {
            started_at: now,
            starting_rating: event.previous_rating(),
            wins: 0,
            losses: 0,
            total_battles: 0,
            events: Vec::new(),
            last_activity: now,
        };
        session.record(event, now);
        session
    }

    /// Appends an event and refreshes the activity timestamp.
    pub fn record(&mut self, event: BattleEvent, now: DateTime<Utc>) {
        let contribution = event.result.contribution();
        self.wins = self.wins.saturating_add(contribution.wins);
        self.losses = self.losses.saturating_add(contribution.losses);
        self.total_battles = self.total_battles.saturating_add(contribution.battles);
        self.events.push(event);
        self.last_activity = now;
    }

    /// The most recent rating observed in this session.
    pub fn current_rating(&self) -> i64 {
        self.events
            .last()
            .map_or(self.starting_rating, |e| e.new_rating)
    }

    pub fn net_rating_change(&self) -> i64 {
        self.current_rating().saturating_sub(self.starting_rating)
    }

    /// How long since the last recorded event.
    pub fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        now - self.last_activity
    }

    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            started_at: self.started_at,
            wins: self.wins,
            losses: self.losses,
            total_battles: self.total_battles,
            win_rate_percent: win_rate_percent(self.wins, self.total_battles),
            starting_rating: self.starting_rating,
            current_rating: self.current_rating(),
            net_rating_change: self.net_rating_change(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{event_at, t0};
    use crate::types::BattleResult;

    #[test]
    fn begin_takes_rating_before_event() {
        let event = event_at(BattleResult::Victory, 15, 1515, 0);
        let session = ActiveSession::begin(event, t0());

        assert_eq!(session.starting_rating, 1500);
        assert_eq!(session.wins, 1);
        assert_eq!(session.total_battles, 1);
        assert_eq!(session.started_at, t0());
    }

    #[test]
    fn record_accumulates_contributions() {
        let mut session = ActiveSession::begin(event_at(BattleResult::Victory, 15, 1515, 0), t0());
        session.record(
            event_at(BattleResult::Mixed { wins: 2, losses: 1 }, -5, 1510, 10),
            t0() + Duration::minutes(10),
        );

        assert_eq!(session.wins, 3);
        assert_eq!(session.losses, 1);
        assert_eq!(session.total_battles, 4);
        assert_eq!(session.events.len(), 2);
        assert_eq!(session.net_rating_change(), 10);
        assert_eq!(session.last_activity, t0() + Duration::minutes(10));
    }

    #[test]
    fn idle_state_has_no_session() {
        let state = SessionState::default();
        assert!(!state.is_active());
        assert!(state.active().is_none());
    }
}
