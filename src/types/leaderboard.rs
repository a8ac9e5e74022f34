//! Leaderboard pages, entries and rank query results.
//!
//! Entries are reconstructed for each query and never persisted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ids::{EraIndex, TeamName};

/// One ranked squadron on a leaderboard page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub team_id: String,
    pub name: String,

    /// Cumulative rating per scoring era, keyed by era index.
    #[serde(default)]
    pub era_stats: BTreeMap<EraIndex, i64>,

    /// Absolute position, 1-based. Sources that do not report it send 0;
    /// the resolver computes it from the page arithmetic.
    #[serde(default)]
    pub position: u32,
}

impl LeaderboardEntry {
    /// The highest-indexed era holding a positive cumulative value.
    pub fn latest_active_era(&self) -> Option<EraIndex> {
        self.era_stats
            .iter()
            .rev()
            .find(|(_, value)| **value > 0)
            .map(|(era, _)| *era)
    }

    /// The cumulative value for an era, zero if absent.
    pub fn rating_in(&self, era: EraIndex) -> i64 {
        self.era_stats.get(&era).copied().unwrap_or(0)
    }
}

/// A fixed-size slice of the leaderboard as returned by the data source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardPage {
    pub entries: Vec<LeaderboardEntry>,
}

impl LeaderboardPage {
    pub fn new(entries: Vec<LeaderboardEntry>) -> Self {
        LeaderboardPage { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A squadron adjacent to the queried one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbor {
    pub team_id: String,
    pub name: String,
    pub position: u32,
    pub rating_value: i64,
}

/// The outcome of a successful rank lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankQueryResult {
    /// The team as named on the leaderboard (which may differ in case from the query).
    pub team: TeamName,
    pub team_id: String,
    pub position: u32,
    pub era: EraIndex,
    pub rating_value: i64,
    pub neighbor_above: Option<Neighbor>,

    /// `None` means no team below, including when the next page could not be read.
    pub neighbor_below: Option<Neighbor>,
}
