//! Era detection and page arithmetic.

use crate::types::{EraIndex, LeaderboardPage, PageNumber};

/// The era whose sort key is used for the first, detecting fetch.
pub const DEFAULT_ERA: EraIndex = EraIndex(5);

/// Number of entries per leaderboard page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// The current era according to the first entry of `page`: the highest-indexed
/// era with a positive cumulative value.
///
/// Returns `None` for an empty page or when the first entry has no positive
/// value in any era.
pub fn detect_era(page: &LeaderboardPage) -> Option<EraIndex> {
    page.entries.first()?.latest_active_era()
}

/// Absolute 1-based position of the entry at `index` (0-based) on `page`.
pub fn position(page: PageNumber, page_size: u32, index: usize) -> u32 {
    (page.0 - 1) * page_size + index as u32 + 1
}
