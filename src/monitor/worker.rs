//! The poll loop.
//!
//! A [`Monitor`] is the single writer of session state. Both tick sources (the
//! snapshot poll and the idle check) run on the task that owns it, so they
//! never interleave, and a poll that overruns its interval causes the next tick
//! to be skipped rather than queued.
//!
//! # Lifecycle
//!
//! 1. The first successful poll records a baseline and publishes `Connected`.
//!    Failures before that publish `Unreachable` once.
//! 2. Each later poll is diffed against the previous snapshot; inferred battles
//!    go to the session tracker and are published.
//! 3. Idle checks close stale sessions and publish their summaries.
//! 4. On shutdown any running session is closed and its summary published
//!    before `run` returns.

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::clock::Clock;
use crate::diff::{Consistency, SnapshotDiff, diff_with_policy};
use crate::notify::{MonitorStatus, Notification, Notifier};
use crate::session::{SessionSummary, SessionTracker};
use crate::source::DataSource;
use crate::types::{BattleEvent, Snapshot};

use super::config::MonitorConfig;
use super::view::SessionView;

/// What a single poll did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// First successful fetch; nothing to compare against yet.
    Baseline,

    Unchanged,

    Battle {
        event: BattleEvent,
        started_session: bool,
    },

    /// Counters went backwards. The new snapshot replaced the baseline.
    Regressed,

    /// The fetch failed after retries; state is unchanged.
    SourceUnavailable,
}

pub struct Monitor<S, N, C> {
    config: MonitorConfig,
    source: S,
    notifier: N,
    tracker: SessionTracker<C>,
    previous: Option<Snapshot>,
    unreachable_reported: bool,
    view: watch::Sender<SessionView>,
}

impl<S, N, C> Monitor<S, N, C>
where
    S: DataSource,
    N: Notifier,
    C: Clock,
{
    pub fn new(config: MonitorConfig, source: S, notifier: N, clock: C) -> Self {
        let tracker = SessionTracker::new(config.idle_timeout_chrono(), clock);
        let (view, _) = watch::channel(SessionView::new(config.team.clone()));
        Monitor {
            config,
            source,
            notifier,
            tracker,
            previous: None,
            unreachable_reported: false,
            view,
        }
    }

    /// A read-only feed of the monitor's state.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.subscribe()
    }

    pub fn tracker(&self) -> &SessionTracker<C> {
        &self.tracker
    }

    pub fn previous_snapshot(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }

    /// Fetches a snapshot and applies whatever changed since the last one.
    #[instrument(skip(self), fields(team = %self.config.team))]
    pub async fn poll_once(&mut self) -> PollOutcome {
        let polled_at = self.tracker.clock().now();

        let snapshot = match self.source.fetch_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Snapshot fetch failed; skipping this poll");
                self.view.send_modify(|v| {
                    v.last_polled_at = Some(polled_at);
                    v.source_reachable = false;
                });
                if self.previous.is_none() && !self.unreachable_reported {
                    self.unreachable_reported = true;
                    self.publish(Notification::MonitorStatus {
                        team: self.config.team.clone(),
                        status: MonitorStatus::Unreachable {
                            error: e.to_string(),
                        },
                    })
                    .await;
                }
                return PollOutcome::SourceUnavailable;
            }
        };

        self.view.send_modify(|v| {
            v.last_polled_at = Some(polled_at);
            v.source_reachable = true;
            v.last_snapshot = Some(snapshot.clone());
        });

        let Some(previous) = self.previous.replace(snapshot.clone()) else {
            info!(
                rating = snapshot.rating,
                wins = snapshot.wins,
                losses = snapshot.losses,
                "Baseline recorded"
            );
            self.publish(Notification::MonitorStatus {
                team: self.config.team.clone(),
                status: MonitorStatus::Connected { snapshot },
            })
            .await;
            return PollOutcome::Baseline;
        };

        match diff_with_policy(&previous, &snapshot, self.config.inference) {
            SnapshotDiff::NoChange => {
                debug!("No change since last poll");
                PollOutcome::Unchanged
            }
            SnapshotDiff::Regressed { deltas } => {
                warn!(
                    wins_delta = deltas.wins,
                    losses_delta = deltas.losses,
                    rating_delta = deltas.rating,
                    "DataInconsistency: counters decreased; re-baselining"
                );
                PollOutcome::Regressed
            }
            SnapshotDiff::Battle { event, consistency } => {
                if consistency == Consistency::RatingOnly {
                    warn!(
                        rating_delta = event.rating_delta,
                        result = ?event.result,
                        "DataInconsistency: rating moved without counter change"
                    );
                }
                self.record(event, consistency).await
            }
        }
    }

    async fn record(&mut self, event: BattleEvent, consistency: Consistency) -> PollOutcome {
        let update = self.tracker.record(event.clone());
        let progress = update.progress().clone();
        let started_session = update.is_start();
        self.refresh_session_view();

        if started_session {
            self.publish(Notification::SessionStarted {
                team: self.config.team.clone(),
                started_at: progress.started_at,
                starting_rating: progress.starting_rating,
            })
            .await;
        }
        self.publish(Notification::BattleRecorded {
            team: self.config.team.clone(),
            event: event.clone(),
            consistency,
            progress,
        })
        .await;

        PollOutcome::Battle {
            event,
            started_session,
        }
    }

    /// Ends the session if it has been idle long enough.
    pub async fn idle_tick(&mut self) -> Option<SessionSummary> {
        let summary = self.tracker.check_idle()?;
        self.finish(summary.clone()).await;
        Some(summary)
    }

    /// Ends any running session.
    pub async fn shutdown(&mut self) -> Option<SessionSummary> {
        let summary = self.tracker.shutdown()?;
        self.finish(summary.clone()).await;
        Some(summary)
    }

    async fn finish(&mut self, summary: SessionSummary) {
        self.refresh_session_view();
        self.view
            .send_modify(|v| v.last_summary = Some(summary.clone()));
        self.publish(Notification::SessionEnded {
            team: self.config.team.clone(),
            summary,
        })
        .await;
    }

    fn refresh_session_view(&self) {
        let session = self.tracker.state().clone();
        self.view.send_modify(|v| v.session = session);
    }

    /// Delivery failures are logged and otherwise ignored.
    async fn publish(&self, notification: Notification) {
        if let Err(e) = self.notifier.publish(&notification).await {
            warn!(kind = notification.kind(), error = %e, "Failed to publish notification");
        }
    }

    /// Runs both ticks until `shutdown` is cancelled, then closes any running
    /// session.
    ///
    /// A poll or check already in progress when shutdown is requested completes
    /// first; data source calls are deadline-bounded, so this wait is bounded.
    #[instrument(skip(self, shutdown), fields(team = %self.config.team))]
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            idle_timeout_secs = self.config.idle_timeout.as_secs(),
            "Monitor started"
        );

        let mut poll = tokio::time::interval(self.config.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut idle = tokio::time::interval(self.config.idle_check_interval);
        idle.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Shutdown signal received, stopping monitor");
                    break;
                }

                _ = poll.tick() => {
                    self.poll_once().await;
                }

                _ = idle.tick() => {
                    self.idle_tick().await;
                }
            }
        }

        self.shutdown().await;
        info!("Monitor stopped");
    }
}
