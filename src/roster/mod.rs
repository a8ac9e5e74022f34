//! Squadron roster validation and reporting views.
//!
//! The data source's member list is noisy: stray header cells, numeric ids in
//! the name column, impossible ratings and duplicates. [`Roster::from_players`]
//! keeps only plausible members, ordered by rating.

pub mod matcher;

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

pub use matcher::{NameMatcher, NormalizedMatcher};

use crate::types::Player;

/// Most members a squadron can have.
pub const MAX_MEMBERS: usize = 128;

/// Highest personal rating considered plausible.
pub const MAX_RATING: i64 = 3000;

const MIN_NAME_LEN: usize = 2;
const MAX_NAME_LEN: usize = 30;

/// A validated roster, highest rating first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Roster {
    members: Vec<Player>,
}

impl Roster {
    /// Validates, de-duplicates and orders a raw member list.
    ///
    /// Names are trimmed. A player is dropped if the name is not 2 to 30
    /// characters long, contains no letter, or is all digits, or if the rating
    /// is outside `0..=3000`. Duplicate names (ignoring case) keep the first
    /// occurrence. At most 128 members are kept.
    pub fn from_players(players: Vec<Player>) -> Self {
        let received = players.len();
        let mut seen = HashSet::new();
        let mut members: Vec<Player> = players
            .into_iter()
            .filter_map(|p| {
                let name = p.name.trim();
                if !is_plausible_name(name) || !(0..=MAX_RATING).contains(&p.rating) {
                    return None;
                }
                seen.insert(name.to_lowercase())
                    .then(|| Player::new(name, p.rating))
            })
            .collect();

        // Stable, so equal ratings keep source order.
        members.sort_by(|a, b| b.rating.cmp(&a.rating));
        members.truncate(MAX_MEMBERS);

        if members.len() != received {
            debug!(received, kept = members.len(), "Dropped roster entries");
        }
        Roster { members }
    }

    pub fn members(&self) -> &[Player] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The `n` highest-rated members.
    pub fn top(&self, n: usize) -> &[Player] {
        &self.members[..n.min(self.members.len())]
    }

    /// Members rated strictly below `threshold`, lowest first.
    pub fn below_threshold(&self, threshold: i64) -> Vec<&Player> {
        self.members
            .iter()
            .rev()
            .filter(|p| p.rating < threshold)
            .collect()
    }

    /// Finds a member by name. An exact case-insensitive match wins over a
    /// fuzzy one.
    pub fn find(&self, name: &str, matcher: &impl NameMatcher) -> Option<&Player> {
        let name = name.trim();
        self.members
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .or_else(|| self.members.iter().find(|p| matcher.matches(name, &p.name)))
    }
}

fn is_plausible_name(name: &str) -> bool {
    let len = name.chars().count();
    (MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len)
        && name.chars().any(char::is_alphabetic)
        && !name.chars().all(|c| c.is_ascii_digit())
}
