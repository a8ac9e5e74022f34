//! Core domain types for squadron monitoring.
//!
//! This module contains the records exchanged between the data source, the
//! differencer, the session tracker and the rank resolver.

pub mod battle;
pub mod ids;
pub mod leaderboard;
pub mod snapshot;

use serde::{Deserialize, Serialize};

// Re-export commonly used types at the module level
pub use battle::{BattleEvent, BattleResult, Contribution};
pub use ids::{EraIndex, PageNumber, SortKey, TeamName};
pub use leaderboard::{LeaderboardEntry, LeaderboardPage, Neighbor, RankQueryResult};
pub use snapshot::{InvalidSnapshot, Snapshot, SnapshotRecord};

/// A squadron member and their personal rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub rating: i64,
}

impl Player {
    pub fn new(name: impl Into<String>, rating: i64) -> Self {
        Player {
            name: name.into(),
            rating,
        }
    }
}
