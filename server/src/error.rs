//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pitchside_browser::BrowserError;
use pitchside_core::PitchsideError;
use pitchside_scraper::ScrapeError;
use serde::Serialize;
use thiserror::Error;

/// Error returned by a handler, rendered as `{error, message}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A path identifier failed validation.
    #[error("{0}")]
    InvalidIdentifier(String),

    /// Extraction or store failure.
    #[error(transparent)]
    Scrape(#[from] ScrapeError),
}

/// Serialized error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable error code (e.g. `"NO_DATA_FOUND"`)
    pub error: String,
    /// Human-readable detail
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
            Self::Scrape(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier(_) => "INVALID_IDENTIFIER",
            Self::Scrape(e) => e.code(),
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.code().to_string(),
            message: self.to_string(),
        }
    }
}

impl From<PitchsideError> for ApiError {
    fn from(err: PitchsideError) -> Self {
        Self::InvalidIdentifier(err.to_string())
    }
}

impl From<BrowserError> for ApiError {
    fn from(err: BrowserError) -> Self {
        Self::Scrape(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(self.body())).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pitchside_core::MatchId;

    #[test]
    fn test_invalid_identifier_is_bad_request() {
        let err: ApiError = MatchId::new("../x").unwrap_err().into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body().error, "INVALID_IDENTIFIER");
    }

    #[test]
    fn test_scrape_failure_is_server_error() {
        let err: ApiError = ScrapeError::NoDataFound("no cards".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = err.body();
        assert_eq!(body.error, "NO_DATA_FOUND");
        assert!(body.message.contains("no cards"));
    }

    #[test]
    fn test_browser_session_loss_keeps_its_code() {
        let err: ApiError = BrowserError::SessionUnavailable("crashed".to_string()).into();
        assert_eq!(err.code(), "SESSION_UNAVAILABLE");
    }

    #[test]
    fn test_body_serialization() {
        let body = ApiError::InvalidIdentifier("bad id".to_string()).body();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "INVALID_IDENTIFIER");
        assert_eq!(json["message"], "bad id");
    }
}
