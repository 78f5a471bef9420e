//! Extraction error taxonomy.

use pitchside_browser::BrowserError;
use pitchside_core::Retryable;
use pitchside_db::DatabaseError;
use thiserror::Error;

/// Errors raised while extracting or serving a record.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The browser could not be (re)launched.
    #[error("browser session unavailable: {0}")]
    SessionUnavailable(String),

    /// The site asked for a login; an operator has to sign in.
    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    /// None of the readiness selectors appeared in time.
    #[error("page not ready: none of {selectors:?} appeared on {page}")]
    ReadinessTimeout {
        /// Page or element that was waited for
        page: String,
        /// Selectors tried, in order
        selectors: Vec<String>,
    },

    /// The page rendered but held no entries.
    #[error("no data found: {0}")]
    NoDataFound(String),

    /// The store failed an explicit maintenance operation.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A browser command failed.
    #[error("browser error: {0}")]
    Browser(BrowserError),

    /// A selector or URL in the configuration is invalid.
    #[error("invalid configuration: {0}")]
    Parse(String),
}

impl From<BrowserError> for ScrapeError {
    fn from(err: BrowserError) -> Self {
        match err {
            BrowserError::SessionUnavailable(reason) => Self::SessionUnavailable(reason),
            other => Self::Browser(other),
        }
    }
}

impl From<DatabaseError> for ScrapeError {
    fn from(err: DatabaseError) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

impl Retryable for ScrapeError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ReadinessTimeout { .. } | Self::NoDataFound(_) | Self::Browser(_)
        )
    }
}

impl ScrapeError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::SessionUnavailable(_) => "SESSION_UNAVAILABLE",
            Self::AuthenticationRequired(_) => "AUTHENTICATION_REQUIRED",
            Self::ReadinessTimeout { .. } => "READINESS_TIMEOUT",
            Self::NoDataFound(_) => "NO_DATA_FOUND",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::Browser(_) => "BROWSER_ERROR",
            Self::Parse(_) => "INVALID_CONFIGURATION",
        }
    }
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;
