//! Session progress and end-of-session summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::BattleEvent;

use super::state::ActiveSession;

/// Most events a summary carries. Older events are counted in `omitted_events`.
pub const MAX_SUMMARY_EVENTS: usize = 25;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    IdleTimeout,
    Shutdown,
}

/// Running totals for an active session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub started_at: DateTime<Utc>,
    pub wins: i64,
    pub losses: i64,
    pub total_battles: i64,
    pub win_rate_percent: u32,
    pub starting_rating: i64,
    pub current_rating: i64,
    pub net_rating_change: i64,
}

/// Emitted exactly once when a session closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub reason: EndReason,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_minutes: i64,
    pub wins: i64,
    pub losses: i64,
    pub total_battles: i64,
    pub win_rate_percent: u32,
    pub starting_rating: i64,
    pub final_rating: i64,
    pub net_rating_change: i64,

    /// The most recent events, oldest first.
    pub events: Vec<BattleEvent>,

    /// Events dropped from the front of `events`.
    pub omitted_events: usize,
}

impl SessionSummary {
    /// Closes out `session` at `ended_at`.
    pub fn close(session: ActiveSession, ended_at: DateTime<Utc>, reason: EndReason) -> Self {
        let final_rating = session.current_rating();
        let net_rating_change = session.net_rating_change();
        let win_rate_percent = win_rate_percent(session.wins, session.total_battles);

        let mut events = session.events;
        let omitted_events = events.len().saturating_sub(MAX_SUMMARY_EVENTS);
        events.drain(..omitted_events);

        SessionSummary {
            reason,
            started_at: session.started_at,
            ended_at,
            duration_minutes: (ended_at - session.started_at).num_minutes(),
            wins: session.wins,
            losses: session.losses,
            total_battles: session.total_battles,
            win_rate_percent,
            starting_rating: session.starting_rating,
            final_rating,
            net_rating_change,
            events,
            omitted_events,
        }
    }
}

/// Wins as a rounded percentage of battles; 0 when there were none.
pub fn win_rate_percent(wins: i64, total_battles: i64) -> u32 {
    if total_battles <= 0 {
        return 0;
    }
    ((wins as f64 / total_battles as f64) * 100.0).round() as u32
}
