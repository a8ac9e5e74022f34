//! Read-only view of the monitor's session state.

use axum::Json;
use axum::extract::State;

use super::AppState;
use crate::monitor::SessionView;

/// Returns the monitor's latest [`SessionView`]: the running session (if
/// any), the last snapshot and the most recent summary.
pub async fn session_handler<S>(State(app_state): State<AppState<S>>) -> Json<SessionView> {
    Json(app_state.session_view())
}
