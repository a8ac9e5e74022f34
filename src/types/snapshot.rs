//! Point-in-time reads of a squadron's aggregate counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point-in-time read of a squadron's rating and battle counters.
///
/// INVARIANT: `total_battles >= wins + losses`. When the source does not report
/// a total (or reports one that contradicts the counters), it is derived as
/// `wins + losses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub rating: i64,
    pub wins: i64,
    pub losses: i64,
    pub total_battles: i64,
    pub timestamp: DateTime<Utc>,
}

impl Snapshot {
    /// Creates a snapshot whose total is derived from wins and losses.
    pub fn new(rating: i64, wins: i64, losses: i64, timestamp: DateTime<Utc>) -> Self {
        Snapshot {
            rating,
            wins,
            losses,
            total_battles: wins.saturating_add(losses),
            timestamp,
        }
    }

    /// Creates a snapshot from independently observed counters.
    ///
    /// An observed total below `wins + losses` is discarded in favour of the
    /// derived value.
    pub fn observed(
        rating: i64,
        wins: i64,
        losses: i64,
        total_battles: Option<i64>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let derived = wins.saturating_add(losses);
        let total_battles = total_battles.filter(|t| *t >= derived).unwrap_or(derived);
        Snapshot {
            rating,
            wins,
            losses,
            total_battles,
            timestamp,
        }
    }
}

/// A source record whose counters cannot describe a real squadron.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSnapshot {
    #[error("{field} is negative ({value})")]
    NegativeCounter { field: &'static str, value: i64 },

    #[error("wins ({wins}) plus losses ({losses}) overflows")]
    CounterOverflow { wins: i64, losses: i64 },
}

/// The wire form of a snapshot as returned by the data source.
///
/// The total and timestamp are optional; [`SnapshotRecord::into_snapshot`]
/// fills them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub rating: i64,
    pub wins: i64,
    pub losses: i64,
    #[serde(default)]
    pub total_battles: Option<i64>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl SnapshotRecord {
    /// Converts to a [`Snapshot`], stamping it with `fetched_at` when the
    /// source did not supply a timestamp.
    ///
    /// Negative counters and counters whose sum overflows are rejected. A
    /// negative total is treated as absent.
    pub fn into_snapshot(self, fetched_at: DateTime<Utc>) -> Result<Snapshot, InvalidSnapshot> {
        for (field, value) in [("wins", self.wins), ("losses", self.losses)] {
            if value < 0 {
                return Err(InvalidSnapshot::NegativeCounter { field, value });
            }
        }
        if self.wins.checked_add(self.losses).is_none() {
            return Err(InvalidSnapshot::CounterOverflow {
                wins: self.wins,
                losses: self.losses,
            });
        }

        Ok(Snapshot::observed(
            self.rating,
            self.wins,
            self.losses,
            self.total_battles.filter(|t| *t >= 0),
            self.timestamp.unwrap_or(fetched_at),
        ))
    }
}
