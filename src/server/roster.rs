//! Roster views.
//!
//! The member list is fetched fresh per request and validated before any view
//! is computed.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};
use crate::roster::{MAX_MEMBERS, Roster};
use crate::source::DataSource;
use crate::types::Player;

/// Size of the default top view.
pub const DEFAULT_TOP: usize = 20;

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    pub top: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ThresholdQuery {
    pub threshold: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RosterView {
    /// Members in the validated roster, before truncation to `players`.
    pub member_count: usize,
    pub players: Vec<Player>,
}

#[derive(Debug, Serialize)]
pub struct LowRatingView {
    pub threshold: i64,
    pub players: Vec<Player>,
}

async fn load_roster<S: DataSource>(app_state: &AppState<S>) -> Result<Roster, ApiError> {
    let players = app_state.source().fetch_players().await?;
    Ok(Roster::from_players(players))
}

/// `GET /api/v1/roster?top=N`: the N highest-rated members (default 20).
pub async fn roster_handler<S: DataSource>(
    State(app_state): State<AppState<S>>,
    Query(query): Query<TopQuery>,
) -> Result<Json<RosterView>, ApiError> {
    let roster = load_roster(&app_state).await?;
    let n = query.top.unwrap_or(DEFAULT_TOP).min(MAX_MEMBERS);
    Ok(Json(RosterView {
        member_count: roster.len(),
        players: roster.top(n).to_vec(),
    }))
}

/// `GET /api/v1/roster/low-rating`: members strictly below the threshold,
/// lowest first. The configured threshold can be overridden with
/// `?threshold=`.
pub async fn low_rating_handler<S: DataSource>(
    State(app_state): State<AppState<S>>,
    Query(query): Query<ThresholdQuery>,
) -> Result<Json<LowRatingView>, ApiError> {
    let roster = load_roster(&app_state).await?;
    let threshold = query.threshold.unwrap_or(app_state.low_rating_threshold());
    Ok(Json(LowRatingView {
        threshold,
        players: roster.below_threshold(threshold).into_iter().cloned().collect(),
    }))
}

/// `GET /api/v1/roster/members/{name}`: one member, matched fuzzily.
pub async fn member_handler<S: DataSource>(
    State(app_state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<Player>, ApiError> {
    let roster = load_roster(&app_state).await?;
    roster
        .find(&name, app_state.matcher())
        .cloned()
        .map(Json)
        .ok_or(ApiError::MemberNotFound { name })
}
