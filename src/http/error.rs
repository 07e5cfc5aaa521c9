//! Handler error taxonomy and its mapping onto HTTP status codes.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::upstream::UpstreamError;

/// Body of every 502 response.
pub const UPSTREAM_FAILED: &str = "Upstream fetch failed";
/// Body of every 500 response.
pub const SERVER_ERROR: &str = "Server error";

/// Failures that abort an avatar request.
///
/// Conversion failures never appear here; they degrade to an SVG response.
#[derive(Debug, Error)]
pub enum AvatarError {
    /// The generator answered with a non-2xx status.
    #[error("upstream returned {0}")]
    Upstream(StatusCode),

    /// The request outlived the configured deadline.
    #[error("request exceeded the {0:?} deadline")]
    Timeout(Duration),

    /// Anything else, such as transport errors or an undecodable body.
    #[error("{0}")]
    Internal(String),
}

impl From<UpstreamError> for AvatarError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Status(status) => AvatarError::Upstream(status),
            other => AvatarError::Internal(other.to_string()),
        }
    }
}

impl AvatarError {
    pub fn status(&self) -> StatusCode {
        match self {
            AvatarError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AvatarError::Timeout(_) | AvatarError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AvatarError {
    fn into_response(self) -> Response {
        match &self {
            AvatarError::Upstream(status) => {
                tracing::warn!(upstream_status = %status, "Upstream fetch failed");
                (self.status(), UPSTREAM_FAILED).into_response()
            }
            AvatarError::Timeout(_) | AvatarError::Internal(_) => {
                tracing::error!(error = %self, "Avatar request failed");
                (self.status(), SERVER_ERROR).into_response()
            }
        }
    }
}
