//! JSON-over-HTTP data source.
//!
//! Expects a service exposing:
//!
//! - `GET {base}/squadrons/{name}` returning a [`SnapshotRecord`]
//! - `GET {base}/squadrons/{name}/players` returning `[Player]`
//! - `GET {base}/leaderboard?page={n}&sort={key}` returning `{ "entries": [...] }`

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::types::{LeaderboardPage, PageNumber, Player, Snapshot, SnapshotRecord, SortKey, TeamName};

use super::DataSource;
use super::error::FetchError;

/// Reads squadron data from a JSON HTTP service.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: Url,
    team: TeamName,
}

impl HttpSource {
    /// Creates a source for `team` against `base_url`.
    ///
    /// `request_timeout` bounds each HTTP request at the client level; the
    /// retry layer applies its own deadline on top.
    pub fn new(base_url: Url, team: TeamName, request_timeout: Duration) -> Result<Self, FetchError> {
        if base_url.cannot_be_a_base() {
            return Err(FetchError::permanent(format!(
                "source URL {} cannot be used as a base",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("squadron-watch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::from_reqwest)?;

        Ok(HttpSource {
            client,
            base_url,
            team,
        })
    }

    pub fn team(&self) -> &TeamName {
        &self.team
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::permanent("source URL cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::from_status(status.as_u16(), body));
        }

        response.json::<T>().await.map_err(FetchError::from_reqwest)
    }
}

impl DataSource for HttpSource {
    #[instrument(skip(self), fields(team = %self.team))]
    async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError> {
        let url = self.endpoint(&["squadrons", self.team.as_str()])?;
        let record: SnapshotRecord = self.get_json(url).await?;
        record
            .into_snapshot(Utc::now())
            .map_err(|e| FetchError::permanent(format!("invalid snapshot: {}", e)))
    }

    #[instrument(skip(self), fields(team = %self.team))]
    async fn fetch_players(&self) -> Result<Vec<Player>, FetchError> {
        let url = self.endpoint(&["squadrons", self.team.as_str(), "players"])?;
        self.get_json(url).await
    }

    #[instrument(skip(self), fields(page = page.0, sort = %sort))]
    async fn fetch_leaderboard_page(
        &self,
        page: PageNumber,
        sort: &SortKey,
    ) -> Result<LeaderboardPage, FetchError> {
        let mut url = self.endpoint(&["leaderboard"])?;
        url.query_pairs_mut()
            .append_pair("page", &page.0.to_string())
            .append_pair("sort", sort.as_str());
        self.get_json(url).await
    }
}
