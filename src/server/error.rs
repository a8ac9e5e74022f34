//! Error responses for the HTTP API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::leaderboard::RankError;
use crate::source::FetchError;

/// Errors a handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Rank(#[from] RankError),

    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("no roster member matches {name:?}")]
    MemberNotFound { name: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Rank(RankError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Rank(RankError::Fetch(e)) | ApiError::Fetch(e) => fetch_status(e),
            ApiError::MemberNotFound { .. } => StatusCode::NOT_FOUND,
        }
    }
}

/// Transient upstream failures are 503 so clients retry; permanent ones are 502.
fn fetch_status(e: &FetchError) -> StatusCode {
    if e.is_transient() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::BAD_GATEWAY
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
