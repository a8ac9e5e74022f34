//! The single owner of session state.

use chrono::Duration;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::types::BattleEvent;

use super::state::SessionState;
use super::summary::SessionSummary;
use super::transitions::{SessionUpdate, on_battle, on_idle_check, on_shutdown};

/// Owns the session state and applies transitions against an injected clock.
///
/// Every mutating method takes `&mut self`; callers that drive it from more than
/// one tick source must serialize access (the monitor does so by running both
/// ticks on one task).
#[derive(Debug)]
pub struct SessionTracker<C> {
    state: SessionState,
    idle_timeout: Duration,
    clock: C,
}

impl<C: Clock> SessionTracker<C> {
    pub fn new(idle_timeout: Duration, clock: C) -> Self {
        SessionTracker {
            state: SessionState::Idle,
            idle_timeout,
            clock,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Records an inferred battle.
    pub fn record(&mut self, event: BattleEvent) -> SessionUpdate {
        let now = self.clock.now();
        let (next, update) = on_battle(std::mem::take(&mut self.state), event, now);
        self.state = next;

        let progress = update.progress();
        if update.is_start() {
            info!(
                starting_rating = progress.starting_rating,
                "Session started"
            );
        } else {
            debug!(
                wins = progress.wins,
                losses = progress.losses,
                net_rating_change = progress.net_rating_change,
                "Session continued"
            );
        }
        update
    }

    /// Ends the session if it has been idle for at least the timeout.
    pub fn check_idle(&mut self) -> Option<SessionSummary> {
        let now = self.clock.now();
        let (next, summary) = on_idle_check(std::mem::take(&mut self.state), now, self.idle_timeout);
        self.state = next;

        if let Some(summary) = &summary {
            info!(
                battles = summary.total_battles,
                duration_minutes = summary.duration_minutes,
                net_rating_change = summary.net_rating_change,
                "Session ended after {} minutes idle",
                self.idle_timeout.num_minutes()
            );
        }
        summary
    }

    /// Ends any running session. Used on shutdown.
    pub fn shutdown(&mut self) -> Option<SessionSummary> {
        let now = self.clock.now();
        let (next, summary) = on_shutdown(std::mem::take(&mut self.state), now);
        self.state = next;

        if let Some(summary) = &summary {
            info!(
                battles = summary.total_battles,
                "Session ended by shutdown"
            );
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::session::EndReason;
    use crate::test_utils::{event_at, t0};
    use crate::types::BattleResult;

    fn tracker(timeout_mins: i64) -> (SessionTracker<ManualClock>, ManualClock) {
        let clock = ManualClock::new(t0());
        (
            SessionTracker::new(Duration::minutes(timeout_mins), clock.clone()),
            clock,
        )
    }

    #[test]
    fn one_battle_then_idle_ticks_emit_exactly_one_summary() {
        let (mut tracker, clock) = tracker(30);

        let update = tracker.record(event_at(BattleResult::Victory, 15, 1515, 0));
        assert!(update.is_start());
        assert_eq!(tracker.state().active().unwrap().starting_rating, 1500);

        // Tick every minute for 40 minutes.
        let mut summaries = Vec::new();
        for _ in 0..40 {
            clock.advance(Duration::minutes(1));
            if let Some(summary) = tracker.check_idle() {
                summaries.push((clock.now(), summary));
            }
        }

        assert_eq!(summaries.len(), 1);
        let (closed_at, summary) = &summaries[0];
        assert_eq!(*closed_at, t0() + Duration::minutes(30));
        assert_eq!(summary.reason, EndReason::IdleTimeout);
        assert_eq!(summary.wins, 1);
        assert!(!tracker.state().is_active());
    }

    #[test]
    fn activity_postpones_timeout() {
        let (mut tracker, clock) = tracker(30);
        tracker.record(event_at(BattleResult::Victory, 15, 1515, 0));

        clock.advance(Duration::minutes(25));
        tracker.record(event_at(BattleResult::Defeat, -10, 1505, 25));

        clock.advance(Duration::minutes(25));
        assert!(tracker.check_idle().is_none());

        clock.advance(Duration::minutes(5));
        let summary = tracker.check_idle().unwrap();
        assert_eq!(summary.total_battles, 2);
    }

    #[test]
    fn new_session_after_timeout_rebases_starting_rating() {
        let (mut tracker, clock) = tracker(30);
        tracker.record(event_at(BattleResult::Victory, 15, 1515, 0));
        clock.advance(Duration::minutes(31));
        tracker.check_idle().unwrap();

        let update = tracker.record(event_at(BattleResult::Defeat, -15, 1500, 31));
        assert!(update.is_start());
        assert_eq!(update.progress().starting_rating, 1515);
        assert_eq!(update.progress().wins, 0);
        assert_eq!(update.progress().losses, 1);
    }

    #[test]
    fn shutdown_emits_summary_once() {
        let (mut tracker, _clock) = tracker(60);
        tracker.record(event_at(BattleResult::Victory, 15, 1515, 0));

        assert!(tracker.shutdown().is_some());
        assert!(tracker.shutdown().is_none());
    }
}
