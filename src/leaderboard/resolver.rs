//! Locates a team and its neighbors on the paginated leaderboard.
//!
//! Resolution runs in three phases:
//!
//! 1. Fetch page 1 under the default era's sort key and detect the current era
//!    from its first entry. If the detected key is the default one, page 1 is
//!    reused.
//! 2. Scan pages in order under the detected key until a name matches, an empty
//!    page is returned, or the page ceiling is reached.
//! 3. Build neighbors. "Above" comes from the same page or the page scanned just
//!    before. "Below" comes from the same page or a fetch of the next page; that
//!    fetch failing or coming back empty means there is no team below.
//!
//! No ordering key other than the final position is visible to clients, so the
//! scan is linear.

use tracing::{debug, info, instrument, warn};

use crate::source::DataSource;
use crate::types::{
    EraIndex, LeaderboardEntry, LeaderboardPage, Neighbor, PageNumber, RankQueryResult, SortKey,
    TeamName,
};

use super::RankError;
use super::era::{DEFAULT_ERA, DEFAULT_PAGE_SIZE, detect_era, position};

#[derive(Debug, Clone, Copy)]
pub struct LeaderboardConfig {
    pub page_size: u32,

    /// Hard ceiling on pages scanned per query.
    pub max_pages: u32,

    /// Era used for the detecting fetch and when detection finds nothing.
    pub default_era: EraIndex,
}

impl LeaderboardConfig {
    pub const DEFAULT: Self = Self {
        page_size: DEFAULT_PAGE_SIZE,
        max_pages: 50,
        default_era: DEFAULT_ERA,
    };

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Resolves rank queries against a data source.
///
/// Holds no mutable state; concurrent `resolve` calls are independent.
#[derive(Debug, Clone)]
pub struct RankResolver<S> {
    source: S,
    config: LeaderboardConfig,
}

impl<S: DataSource> RankResolver<S> {
    pub fn new(source: S, config: LeaderboardConfig) -> Self {
        RankResolver { source, config }
    }

    /// Finds `team` on the current era's leaderboard.
    #[instrument(skip(self), fields(team = %team))]
    pub async fn resolve(&self, team: &TeamName) -> Result<RankQueryResult, RankError> {
        let (era, key, mut current) = self.detect().await?;
        let mut page = PageNumber::FIRST;
        let mut previous: Option<LeaderboardPage> = None;

        loop {
            if current.is_empty() {
                let pages_scanned = page.0 - 1;
                debug!(pages_scanned, "Reached end of leaderboard");
                return Err(RankError::NotFound {
                    team: team.clone(),
                    pages_scanned,
                });
            }

            if let Some(index) = current.entries.iter().position(|e| team.matches(&e.name)) {
                let result = self
                    .build_result(era, &key, page, index, &current, previous.as_ref())
                    .await;
                info!(position = result.position, %era, "Resolved rank");
                return Ok(result);
            }

            if page.0 >= self.config.max_pages {
                debug!(pages_scanned = page.0, "Reached page ceiling");
                return Err(RankError::NotFound {
                    team: team.clone(),
                    pages_scanned: page.0,
                });
            }

            page = page.next();
            let next = self.source.fetch_leaderboard_page(page, &key).await?;
            previous = Some(std::mem::replace(&mut current, next));
        }
    }

    /// Detects the current era, returning its sort key and page 1 under it.
    async fn detect(&self) -> Result<(EraIndex, SortKey, LeaderboardPage), RankError> {
        let default_key = self.config.default_era.sort_key();
        let first = self
            .source
            .fetch_leaderboard_page(PageNumber::FIRST, &default_key)
            .await?;

        let era = detect_era(&first).unwrap_or(self.config.default_era);
        let key = era.sort_key();
        debug!(%era, sort = %key, "Detected era");

        if key == default_key {
            return Ok((era, key, first));
        }
        let first = self
            .source
            .fetch_leaderboard_page(PageNumber::FIRST, &key)
            .await?;
        Ok((era, key, first))
    }

    async fn build_result(
        &self,
        era: EraIndex,
        key: &SortKey,
        page: PageNumber,
        index: usize,
        current: &LeaderboardPage,
        previous: Option<&LeaderboardPage>,
    ) -> RankQueryResult {
        let target = &current.entries[index];
        let target_position = position(page, self.config.page_size, index);

        let above = match index.checked_sub(1) {
            Some(i) => current.entries.get(i),
            None => previous.and_then(|p| p.entries.last()),
        };

        let neighbor_below = match current.entries.get(index + 1) {
            Some(entry) => Some(neighbor(entry, era, target_position + 1)),
            None => self
                .first_of_next_page(page, key)
                .await
                .map(|entry| neighbor(&entry, era, target_position + 1)),
        };

        RankQueryResult {
            team: TeamName::new(target.name.clone()),
            team_id: target.team_id.clone(),
            position: target_position,
            era,
            rating_value: target.rating_in(era),
            neighbor_above: above.map(|entry| neighbor(entry, era, target_position - 1)),
            neighbor_below,
        }
    }

    async fn first_of_next_page(&self, page: PageNumber, key: &SortKey) -> Option<LeaderboardEntry> {
        match self.source.fetch_leaderboard_page(page.next(), key).await {
            Ok(next) => next.entries.into_iter().next(),
            Err(e) => {
                warn!(page = page.next().0, error = %e, "Could not fetch page below; assuming none");
                None
            }
        }
    }
}

fn neighbor(entry: &LeaderboardEntry, era: EraIndex, position: u32) -> Neighbor {
    Neighbor {
        team_id: entry.team_id.clone(),
        name: entry.name.clone(),
        position,
        rating_value: entry.rating_in(era),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FetchError;
    use crate::test_utils::{ScriptedSource, entry, filler_page};
    use std::sync::Arc;

    const ERA5: &str = "dr_era5";
    const ERA6: &str = "dr_era6";

    fn resolver(source: Arc<ScriptedSource>) -> RankResolver<Arc<ScriptedSource>> {
        RankResolver::new(source, LeaderboardConfig::DEFAULT.with_max_pages(10))
    }

    /// A page of 20 where `name` sits at `index`.
    fn page_with(prefix: &str, name: &str, index: usize, era: u8) -> LeaderboardPage {
        let mut page = filler_page(prefix, 20, era, 5000);
        page.entries[index] = entry(&format!("id-{}", name), name, &[(era, 4242)]);
        page
    }

    #[tokio::test]
    async fn finds_team_on_third_page_with_inline_neighbors() {
        let source = Arc::new(ScriptedSource::new());
        source.add_page(1, ERA5, filler_page("a", 20, 5, 9000));
        source.add_page(2, ERA5, filler_page("b", 20, 5, 8000));
        source.add_page(3, ERA5, page_with("c", "Sky Pirates", 4, 5));

        let result = resolver(source.clone())
            .resolve(&TeamName::new("sky pirates"))
            .await
            .unwrap();

        // Two full pages precede it, and index 4 is the fifth entry on page 3.
        assert_eq!(result.position, 45);
        assert_eq!(result.team, TeamName::new("Sky Pirates"));
        assert_eq!(result.team_id, "id-Sky Pirates");
        assert_eq!(result.era, EraIndex(5));
        assert_eq!(result.rating_value, 4242);

        let above = result.neighbor_above.unwrap();
        assert_eq!(above.name, "c3");
        assert_eq!(above.position, 44);
        let below = result.neighbor_below.unwrap();
        assert_eq!(below.name, "c5");
        assert_eq!(below.position, 46);

        // Page 1 was reused; no page after 3 was needed.
        let pages: Vec<u32> = source.page_requests().iter().map(|(p, _)| p.0).collect();
        assert_eq!(pages, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn switches_to_detected_era_key() {
        let source = Arc::new(ScriptedSource::new());
        // Under the default key the first entry is already active in era 6.
        source.add_page(
            1,
            ERA5,
            LeaderboardPage::new(vec![entry("x", "Stale", &[(5, 100), (6, 30)])]),
        );
        source.add_page(1, ERA6, page_with("a", "Sky Pirates", 0, 6));

        let result = resolver(source.clone())
            .resolve(&TeamName::new("Sky Pirates"))
            .await
            .unwrap();

        assert_eq!(result.era, EraIndex(6));
        assert_eq!(result.position, 1);
        assert!(result.neighbor_above.is_none());

        let requests = source.page_requests();
        assert_eq!(requests[0], (PageNumber(1), SortKey::new(ERA5)));
        assert!(requests[1..].iter().all(|(_, k)| k.as_str() == ERA6));
    }

    #[tokio::test]
    async fn first_on_page_takes_above_from_previous_page() {
        let source = Arc::new(ScriptedSource::new());
        source.add_page(1, ERA5, filler_page("a", 20, 5, 9000));
        source.add_page(2, ERA5, page_with("b", "Sky Pirates", 0, 5));

        let result = resolver(source)
            .resolve(&TeamName::new("Sky Pirates"))
            .await
            .unwrap();

        assert_eq!(result.position, 21);
        let above = result.neighbor_above.unwrap();
        assert_eq!(above.name, "a19");
        assert_eq!(above.position, 20);
        assert_eq!(result.neighbor_below.unwrap().name, "b1");
    }

    #[tokio::test]
    async fn last_on_page_takes_below_from_next_page() {
        let source = Arc::new(ScriptedSource::new());
        source.add_page(1, ERA5, page_with("a", "Sky Pirates", 19, 5));
        source.add_page(2, ERA5, filler_page("b", 20, 5, 4000));

        let result = resolver(source)
            .resolve(&TeamName::new("Sky Pirates"))
            .await
            .unwrap();

        assert_eq!(result.position, 20);
        let below = result.neighbor_below.unwrap();
        assert_eq!(below.name, "b0");
        assert_eq!(below.position, 21);
        assert_eq!(below.rating_value, 4000);
    }

    #[tokio::test]
    async fn failed_next_page_means_no_team_below() {
        let source = Arc::new(ScriptedSource::new());
        source.add_page(1, ERA5, page_with("a", "Sky Pirates", 19, 5));
        source.fail_page(2, ERA5);

        let result = resolver(source)
            .resolve(&TeamName::new("Sky Pirates"))
            .await
            .unwrap();

        assert!(result.neighbor_below.is_none());
        assert!(result.neighbor_above.is_some());
    }

    #[tokio::test]
    async fn empty_next_page_means_no_team_below() {
        let source = Arc::new(ScriptedSource::new());
        source.add_page(1, ERA5, page_with("a", "Sky Pirates", 19, 5));

        let result = resolver(source)
            .resolve(&TeamName::new("Sky Pirates"))
            .await
            .unwrap();

        assert!(result.neighbor_below.is_none());
    }

    #[tokio::test]
    async fn absent_team_is_not_found_every_time() {
        let source = Arc::new(ScriptedSource::new());
        source.add_page(1, ERA5, filler_page("a", 20, 5, 9000));
        source.add_page(2, ERA5, filler_page("b", 20, 5, 8000));
        source.add_page(3, ERA5, filler_page("c", 20, 5, 7000));
        let resolver = resolver(source);

        for _ in 0..3 {
            match resolver.resolve(&TeamName::new("Sky Pirates")).await {
                Err(RankError::NotFound { pages_scanned, .. }) => assert_eq!(pages_scanned, 3),
                other => panic!("Expected NotFound, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn page_ceiling_bounds_the_scan() {
        let source = Arc::new(ScriptedSource::new());
        for page in 1..=5 {
            source.add_page(page, ERA5, filler_page(&format!("p{}-", page), 20, 5, 9000));
        }
        let resolver = RankResolver::new(source.clone(), LeaderboardConfig::DEFAULT.with_max_pages(3));

        let err = resolver
            .resolve(&TeamName::new("Sky Pirates"))
            .await
            .unwrap_err();

        assert!(matches!(err, RankError::NotFound { pages_scanned: 3, .. }));
        assert!(!err.is_retryable());
        assert_eq!(source.page_requests().len(), 3);
    }

    #[tokio::test]
    async fn transient_failure_mid_scan_aborts_as_retryable() {
        let source = Arc::new(ScriptedSource::new());
        source.add_page(1, ERA5, filler_page("a", 20, 5, 9000));
        source.fail_page(2, ERA5);
        source.add_page(3, ERA5, page_with("c", "Sky Pirates", 0, 5));

        let err = resolver(source)
            .resolve(&TeamName::new("Sky Pirates"))
            .await
            .unwrap_err();

        assert!(matches!(err, RankError::Fetch(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn empty_leaderboard_uses_default_era() {
        let source = Arc::new(ScriptedSource::new());

        let err = resolver(source.clone())
            .resolve(&TeamName::new("Sky Pirates"))
            .await
            .unwrap_err();

        assert!(matches!(err, RankError::NotFound { pages_scanned: 0, .. }));
        assert_eq!(
            source.page_requests(),
            vec![(PageNumber(1), SortKey::new(ERA5))]
        );
    }

    #[tokio::test]
    async fn concurrent_queries_are_independent() {
        let source = Arc::new(ScriptedSource::new());
        let mut page = filler_page("a", 20, 5, 9000);
        page.entries[2] = entry("p", "Sky Pirates", &[(5, 8000)]);
        page.entries[7] = entry("r", "Red Baron", &[(5, 7000)]);
        source.add_page(1, ERA5, page);
        let resolver = resolver(source);

        let pirates = TeamName::new("Sky Pirates");
        let baron = TeamName::new("Red Baron");
        let (a, b) = tokio::join!(resolver.resolve(&pirates), resolver.resolve(&baron));

        assert_eq!(a.unwrap().position, 3);
        assert_eq!(b.unwrap().position, 8);
    }

    #[tokio::test]
    async fn permanent_failure_is_not_retryable() {
        struct Broken;
        impl DataSource for Broken {
            async fn fetch_snapshot(&self) -> Result<crate::types::Snapshot, FetchError> {
                Err(FetchError::permanent("unused"))
            }
            async fn fetch_players(&self) -> Result<Vec<crate::types::Player>, FetchError> {
                Err(FetchError::permanent("unused"))
            }
            async fn fetch_leaderboard_page(
                &self,
                _page: PageNumber,
                _sort: &SortKey,
            ) -> Result<LeaderboardPage, FetchError> {
                Err(FetchError::from_status(404, "gone"))
            }
        }

        let err = RankResolver::new(Broken, LeaderboardConfig::DEFAULT)
            .resolve(&TeamName::new("Sky Pirates"))
            .await
            .unwrap_err();
        assert!(!err.is_retryable());
    }
}
