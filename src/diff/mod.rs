//! Snapshot differencer.
//!
//! Infers battle outcomes from the change between two successive snapshots.
//! The source only exposes aggregate counters, so the inference is best-effort:
//!
//! - No counter or rating movement: nothing happened.
//! - Exactly one battle: Victory iff the win counter moved.
//! - Several battles in one interval: a single combined `Mixed` event. The
//!   rating delta is not attributed to individual battles.
//! - Rating moved but counters did not: the result is inferred from the sign of
//!   the rating delta and the event is marked [`Consistency::RatingOnly`].
//! - A counter decreased: reported as [`SnapshotDiff::Regressed`], never as an
//!   event. Callers should log it and re-baseline.
//!
//! Everything here is pure.

use serde::{Deserialize, Serialize};

use crate::types::{BattleEvent, BattleResult, Snapshot};

/// Controls the fallback used when the rating moved but the counters did not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferencePolicy {
    /// Infer Victory/Defeat from the rating sign. When false, such deltas
    /// produce a [`BattleResult::Unknown`] event.
    pub infer_from_rating_sign: bool,
}

impl InferencePolicy {
    pub const DEFAULT: Self = Self {
        infer_from_rating_sign: true,
    };
}

impl Default for InferencePolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// How well the counters agree with the inferred event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consistency {
    /// Win/loss counters account for the event.
    Counters,

    /// Only the rating moved. The event is a fallback inference and may be a
    /// rating correction unrelated to any battle.
    RatingOnly,
}

/// The per-field change between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deltas {
    pub wins: i64,
    pub losses: i64,
    pub rating: i64,
}

impl Deltas {
    pub fn between(previous: &Snapshot, current: &Snapshot) -> Self {
        Deltas {
            wins: current.wins.saturating_sub(previous.wins),
            losses: current.losses.saturating_sub(previous.losses),
            rating: current.rating.saturating_sub(previous.rating),
        }
    }

    /// Number of battles the counters account for.
    pub fn total(&self) -> i64 {
        self.wins.saturating_add(self.losses)
    }
}

/// Result of comparing two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotDiff {
    /// Nothing changed.
    NoChange,

    /// One inferred event, possibly combining several battles.
    Battle {
        event: BattleEvent,
        consistency: Consistency,
    },

    /// At least one counter went backwards. No event is produced.
    Regressed { deltas: Deltas },
}

impl SnapshotDiff {
    /// The events produced by this diff (zero or one).
    pub fn events(&self) -> impl Iterator<Item = &BattleEvent> {
        let event = match self {
            SnapshotDiff::Battle { event, .. } => Some(event),
            _ => None,
        };
        event.into_iter()
    }

    /// Consumes the diff, returning its event if any.
    pub fn into_event(self) -> Option<BattleEvent> {
        match self {
            SnapshotDiff::Battle { event, .. } => Some(event),
            _ => None,
        }
    }

    /// True if the counters disagreed with a normal battle (rating-only or regression).
    pub fn is_inconsistent(&self) -> bool {
        matches!(
            self,
            SnapshotDiff::Regressed { .. }
                | SnapshotDiff::Battle {
                    consistency: Consistency::RatingOnly,
                    ..
                }
        )
    }
}

/// Compares two snapshots using the default [`InferencePolicy`].
pub fn diff(previous: &Snapshot, current: &Snapshot) -> SnapshotDiff {
    diff_with_policy(previous, current, InferencePolicy::DEFAULT)
}

/// Compares two snapshots.
pub fn diff_with_policy(
    previous: &Snapshot,
    current: &Snapshot,
    policy: InferencePolicy,
) -> SnapshotDiff {
    let deltas = Deltas::between(previous, current);

    if deltas.wins < 0 || deltas.losses < 0 {
        return SnapshotDiff::Regressed { deltas };
    }

    let event = |result| BattleEvent {
        result,
        rating_delta: deltas.rating,
        new_rating: current.rating,
        timestamp: current.timestamp,
    };

    match deltas.total() {
        0 if deltas.rating == 0 => SnapshotDiff::NoChange,
        0 => {
            let result = if !policy.infer_from_rating_sign {
                BattleResult::Unknown
            } else if deltas.rating > 0 {
                BattleResult::Victory
            } else {
                BattleResult::Defeat
            };
            SnapshotDiff::Battle {
                event: event(result),
                consistency: Consistency::RatingOnly,
            }
        }
        1 => {
            let result = if deltas.wins == 1 {
                BattleResult::Victory
            } else {
                BattleResult::Defeat
            };
            SnapshotDiff::Battle {
                event: event(result),
                consistency: Consistency::Counters,
            }
        }
        _ => SnapshotDiff::Battle {
            event: event(BattleResult::Mixed {
                wins: deltas.wins,
                losses: deltas.losses,
            }),
            consistency: Consistency::Counters,
        },
    }
}
