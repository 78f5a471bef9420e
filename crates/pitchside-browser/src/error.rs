use pitchside_core::Retryable;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("chromium error: {0}")]
    ChromiumError(String),

    #[error("browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("navigation failed: {0}")]
    NavigationError(String),

    #[error("selector not found: {0}")]
    SelectorNotFound(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("script evaluation failed: {0}")]
    EvaluationError(String),

    #[error("browser session unavailable: {0}")]
    SessionUnavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Self::ChromiumError(err.to_string())
    }
}

impl Retryable for BrowserError {
    fn is_retryable(&self) -> bool {
        !matches!(self, Self::SessionUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BrowserError::NavigationError("page not found".to_string());
        assert_eq!(err.to_string(), "navigation failed: page not found");
    }

    #[test]
    fn test_session_unavailable_is_final() {
        assert!(!BrowserError::SessionUnavailable("gone".to_string()).is_retryable());
        assert!(BrowserError::Timeout("slow".to_string()).is_retryable());
        assert!(BrowserError::LaunchFailed("crashed".to_string()).is_retryable());
    }
}
