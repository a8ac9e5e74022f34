//! Health check endpoint for liveness probes.
//!
//! Returns 200 whenever the server is running. The body also says whether the
//! monitor's last poll reached the data source, which is informational only:
//! an unreachable source is not a reason to restart the process.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::AppState;
use crate::types::TeamName;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub team: TeamName,
    pub source_reachable: bool,
    pub last_polled_at: Option<DateTime<Utc>>,
}

/// Health check handler.
///
/// ```ignore
/// GET /health HTTP/1.1
///
/// HTTP/1.1 200 OK
/// Content-Type: application/json
///
/// {"status":"ok","team":"Sky Pirates","source_reachable":true,"last_polled_at":"..."}
/// ```
pub async fn health_handler<S>(State(app_state): State<AppState<S>>) -> (StatusCode, Json<HealthReport>) {
    let view = app_state.session_view();
    (
        StatusCode::OK,
        Json(HealthReport {
            status: "ok",
            team: view.team,
            source_reachable: view.source_reachable,
            last_polled_at: view.last_polled_at,
        }),
    )
}
