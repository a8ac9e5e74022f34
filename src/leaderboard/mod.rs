//! Leaderboard rank resolution with era detection.

pub mod era;
pub mod resolver;

use thiserror::Error;

pub use era::{DEFAULT_ERA, DEFAULT_PAGE_SIZE, detect_era, position};
pub use resolver::{LeaderboardConfig, RankResolver};

use crate::source::FetchError;
use crate::types::TeamName;

/// Why a rank query produced no result.
#[derive(Debug, Error)]
pub enum RankError {
    /// The team did not appear within the scanned pages. Not retried.
    #[error("{team} not found in the first {pages_scanned} leaderboard pages")]
    NotFound { team: TeamName, pages_scanned: u32 },

    /// A page fetch failed; the whole query is abandoned.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl RankError {
    /// Whether asking again later might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            RankError::NotFound { .. } => false,
            RankError::Fetch(e) => e.is_transient(),
        }
    }
}
