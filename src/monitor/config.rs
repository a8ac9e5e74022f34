//! Cadences and policies for the monitor loop.

use std::time::Duration;

use crate::diff::InferencePolicy;
use crate::types::TeamName;

/// Default poll interval (5 minutes).
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;

/// Default idle time after which a session ends (30 minutes).
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 1800;

/// Default cadence of the idle check (60 seconds).
pub const DEFAULT_IDLE_CHECK_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// The squadron being watched.
    pub team: TeamName,

    /// Interval between snapshot polls. A poll still in flight when the next
    /// tick is due causes that tick to be skipped.
    pub poll_interval: Duration,

    /// How long a session may go without a battle before it ends.
    pub idle_timeout: Duration,

    /// Interval between idle checks. Independent of the poll interval; a
    /// session ends at most one check interval after its timeout elapses.
    pub idle_check_interval: Duration,

    pub inference: InferencePolicy,
}

impl MonitorConfig {
    pub fn new(team: TeamName) -> Self {
        MonitorConfig {
            team,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
            idle_check_interval: Duration::from_secs(DEFAULT_IDLE_CHECK_SECS),
            inference: InferencePolicy::DEFAULT,
        }
    }

    /// The idle timeout as a calendar duration, for comparing event timestamps.
    pub fn idle_timeout_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.idle_timeout).unwrap_or(chrono::Duration::MAX)
    }
}
