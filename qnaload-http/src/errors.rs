//! HTTP error types

use qnaload_core::RequestErrorKind;
use std::time::Duration;

/// Error type for HTTP operations
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid header name: {0}")]
    InvalidHeaderName(String),

    #[error("Invalid header value for {0}")]
    InvalidHeaderValue(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl HttpError {
    /// How a failed request is counted in the run metrics
    pub fn kind(&self) -> RequestErrorKind {
        match self {
            HttpError::Timeout(_) => RequestErrorKind::Timeout,
            HttpError::NetworkError(e) if e.is_timeout() => RequestErrorKind::Timeout,
            _ => RequestErrorKind::Failed,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == RequestErrorKind::Timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            HttpError::Timeout(Duration::from_secs(1)).kind(),
            RequestErrorKind::Timeout
        );
        assert!(HttpError::InvalidUrl("x".into()).kind() == RequestErrorKind::Failed);
        assert!(!HttpError::InvalidHeaderName("x y".into()).is_timeout());
    }
}
