//! Rank query endpoints.
//!
//! - `GET /api/v1/rank` resolves the monitored squadron
//! - `GET /api/v1/rank/{team}` resolves any squadron by name
//!
//! Each request runs its own scan; concurrent requests share nothing but the
//! data source.

use axum::Json;
use axum::extract::{Path, State};
use tracing::debug;

use super::{ApiError, AppState};
use crate::source::DataSource;
use crate::types::{RankQueryResult, TeamName};

pub async fn own_rank_handler<S: DataSource>(
    State(app_state): State<AppState<S>>,
) -> Result<Json<RankQueryResult>, ApiError> {
    let team = app_state.team().clone();
    resolve(&app_state, &team).await
}

pub async fn team_rank_handler<S: DataSource>(
    State(app_state): State<AppState<S>>,
    Path(team): Path<String>,
) -> Result<Json<RankQueryResult>, ApiError> {
    resolve(&app_state, &TeamName::new(team.trim())).await
}

async fn resolve<S: DataSource>(
    app_state: &AppState<S>,
    team: &TeamName,
) -> Result<Json<RankQueryResult>, ApiError> {
    debug!(%team, "Rank query");
    let result = app_state.resolver().resolve(team).await?;
    Ok(Json(result))
}
