//! Battle outcomes inferred from snapshot deltas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The inferred outcome of one or more battles between two polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum BattleResult {
    Victory,
    Defeat,

    /// The counters did not identify the outcome and inference was disabled.
    Unknown,

    /// Several battles completed within one poll interval.
    Mixed { wins: i64, losses: i64 },
}

impl BattleResult {
    /// The (wins, losses, battles) this result adds to a session's counters.
    pub fn contribution(&self) -> Contribution {
        match *self {
            BattleResult::Victory => Contribution {
                wins: 1,
                losses: 0,
                battles: 1,
            },
            BattleResult::Defeat => Contribution {
                wins: 0,
                losses: 1,
                battles: 1,
            },
            BattleResult::Unknown => Contribution {
                wins: 0,
                losses: 0,
                battles: 1,
            },
            BattleResult::Mixed { wins, losses } => Contribution {
                wins,
                losses,
                battles: wins.saturating_add(losses),
            },
        }
    }
}

/// Counter increments contributed by a single [`BattleEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Contribution {
    pub wins: i64,
    pub losses: i64,
    pub battles: i64,
}

/// An inferred battle outcome. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleEvent {
    #[serde(flatten)]
    pub result: BattleResult,
    pub rating_delta: i64,
    pub new_rating: i64,
    pub timestamp: DateTime<Utc>,
}

impl BattleEvent {
    /// The rating immediately before this event.
    pub fn previous_rating(&self) -> i64 {
        self.new_rating.saturating_sub(self.rating_delta)
    }
}
