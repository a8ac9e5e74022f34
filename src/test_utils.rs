//! Shared test utilities, fakes and arbitrary generators for property-based testing.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use crate::clock::Clock;
use crate::notify::{Notification, Notifier, PublishError};
use crate::source::{DataSource, FetchError};
use crate::types::{
    BattleEvent, BattleResult, EraIndex, LeaderboardEntry, LeaderboardPage, PageNumber, Player,
    Snapshot, SortKey,
};

// ─── Fixtures ─────────────────────────────────────────────────────────────────

/// A fixed reference instant all fixtures are offset from.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap()
}

pub fn snapshot_at(rating: i64, wins: i64, losses: i64, minutes: i64) -> Snapshot {
    Snapshot::new(rating, wins, losses, t0() + Duration::minutes(minutes))
}

pub fn event_at(result: BattleResult, rating_delta: i64, new_rating: i64, minutes: i64) -> BattleEvent {
    BattleEvent {
        result,
        rating_delta,
        new_rating,
        timestamp: t0() + Duration::minutes(minutes),
    }
}

/// A leaderboard entry with the given per-era values.
pub fn entry(team_id: &str, name: &str, stats: &[(u8, i64)]) -> LeaderboardEntry {
    LeaderboardEntry {
        team_id: team_id.to_string(),
        name: name.to_string(),
        era_stats: stats.iter().map(|(e, v)| (EraIndex(*e), *v)).collect(),
        position: 0,
    }
}

/// A page of `count` filler entries active in `era`, named `{prefix}{n}`.
pub fn filler_page(prefix: &str, count: usize, era: u8, top_value: i64) -> LeaderboardPage {
    LeaderboardPage::new(
        (0..count)
            .map(|i| {
                let name = format!("{}{}", prefix, i);
                entry(&name, &name, &[(era, top_value - i as i64)])
            })
            .collect(),
    )
}

// ─── Strategies ───────────────────────────────────────────────────────────────

pub fn arb_snapshot() -> impl Strategy<Value = Snapshot> {
    (0i64..5000, 0i64..10_000, 0i64..10_000, 0i64..10_000)
        .prop_map(|(rating, wins, losses, minutes)| snapshot_at(rating, wins, losses, minutes))
}

pub fn arb_battle_result() -> impl Strategy<Value = BattleResult> {
    prop_oneof![
        Just(BattleResult::Victory),
        Just(BattleResult::Defeat),
        Just(BattleResult::Unknown),
        (0i64..5, 0i64..5)
            .prop_filter("mixed needs two battles", |(w, l)| w + l >= 2)
            .prop_map(|(wins, losses)| BattleResult::Mixed { wins, losses }),
    ]
}

pub fn arb_battle_event() -> impl Strategy<Value = BattleEvent> {
    (arb_battle_result(), -60i64..60, 0i64..4000, 0i64..600).prop_map(
        |(result, rating_delta, new_rating, minutes)| {
            event_at(result, rating_delta, new_rating, minutes)
        },
    )
}

// ─── Fakes ────────────────────────────────────────────────────────────────────

/// A clock that follows tokio's (pausable) time, starting at `base`.
pub struct TokioClock {
    base: DateTime<Utc>,
    start: tokio::time::Instant,
}

impl TokioClock {
    pub fn new(base: DateTime<Utc>) -> Self {
        TokioClock {
            base,
            start: tokio::time::Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        self.base + Duration::from_std(self.start.elapsed()).unwrap()
    }
}

/// A [`DataSource`] that replays queued responses.
///
/// Snapshots are consumed in order; once the queue is empty every call fails
/// transiently. Leaderboard pages are keyed by page number and sort key; a page
/// that was never added comes back empty.
#[derive(Default)]
pub struct ScriptedSource {
    snapshots: Mutex<VecDeque<Result<Snapshot, FetchError>>>,
    players: Mutex<Vec<Player>>,
    players_fail: AtomicBool,
    pages: Mutex<HashMap<(u32, String), LeaderboardPage>>,
    failing_pages: Mutex<HashSet<(u32, String)>>,
    page_requests: Mutex<Vec<(PageNumber, SortKey)>>,
    snapshot_calls: AtomicU32,
    next_fetch_delay: Mutex<Option<std::time::Duration>>,
    in_flight: AtomicU32,
    peak_in_flight: AtomicU32,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_snapshot(&self, result: Result<Snapshot, FetchError>) {
        self.snapshots.lock().unwrap().push_back(result);
    }

    pub fn set_players(&self, players: Vec<Player>) {
        *self.players.lock().unwrap() = players;
    }

    pub fn fail_players(&self) {
        self.players_fail.store(true, Ordering::SeqCst);
    }

    pub fn add_page(&self, page: u32, sort: &str, contents: LeaderboardPage) {
        self.pages
            .lock()
            .unwrap()
            .insert((page, sort.to_string()), contents);
    }

    pub fn fail_page(&self, page: u32, sort: &str) {
        self.failing_pages
            .lock()
            .unwrap()
            .insert((page, sort.to_string()));
    }

    pub fn snapshot_calls(&self) -> u32 {
        self.snapshot_calls.load(Ordering::SeqCst)
    }

    /// Makes the next snapshot fetch take `delay` before answering.
    pub fn delay_next_fetch(&self, delay: std::time::Duration) {
        *self.next_fetch_delay.lock().unwrap() = Some(delay);
    }

    /// Most snapshot fetches ever in progress at once.
    pub fn peak_in_flight(&self) -> u32 {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Every leaderboard page requested so far, in order.
    pub fn page_requests(&self) -> Vec<(PageNumber, SortKey)> {
        self.page_requests.lock().unwrap().clone()
    }
}

impl DataSource for ScriptedSource {
    async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError> {
        self.snapshot_calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);

        let delay = self.next_fetch_delay.lock().unwrap().take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.snapshots
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::transient("script exhausted")))
    }

    async fn fetch_players(&self) -> Result<Vec<Player>, FetchError> {
        if self.players_fail.load(Ordering::SeqCst) {
            return Err(FetchError::transient("players unavailable"));
        }
        Ok(self.players.lock().unwrap().clone())
    }

    async fn fetch_leaderboard_page(
        &self,
        page: PageNumber,
        sort: &SortKey,
    ) -> Result<LeaderboardPage, FetchError> {
        self.page_requests
            .lock()
            .unwrap()
            .push((page, sort.clone()));

        let key = (page.0, sort.as_str().to_string());
        if self.failing_pages.lock().unwrap().contains(&key) {
            return Err(FetchError::transient(format!("{} unavailable", page)));
        }
        Ok(self
            .pages
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }
}

/// A [`Notifier`] that remembers everything it was asked to publish.
#[derive(Default)]
pub struct RecordingNotifier {
    published: Mutex<Vec<Notification>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later publish fail (the notification is still recorded).
    pub fn fail_deliveries(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn published(&self) -> Vec<Notification> {
        self.published.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(Notification::kind)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    async fn publish(&self, notification: &Notification) -> Result<(), PublishError> {
        self.published.lock().unwrap().push(notification.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(PublishError::Rejected {
                status: 500,
                body: "recording notifier set to fail".to_string(),
            });
        }
        Ok(())
    }
}
