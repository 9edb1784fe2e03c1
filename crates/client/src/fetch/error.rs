//! Fetch error types.

use std::fmt;

/// Errors from a single network attempt.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// The request did not complete within its bound.
    #[error("request timeout")]
    Timeout,

    /// Connection-level failure (DNS, refused, reset, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// Response body exceeds the configured limit.
    #[error("response too large: {size} bytes exceeds {limit}")]
    TooLarge { size: usize, limit: usize },

    /// Anything else (body decode, builder errors).
    #[error("fetch failed: {0}")]
    Other(String),
}

/// Coarse failure reason used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Network,
    Unknown,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Network => "network",
            FailureKind::Unknown => "unknown",
        })
    }
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Timeout => FailureKind::Timeout,
            FetchError::Network(_) => FailureKind::Network,
            FetchError::TooLarge { .. } | FetchError::Other(_) => FailureKind::Unknown,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() || err.is_request() {
            FetchError::Network(err.to_string())
        } else {
            FetchError::Other(err.to_string())
        }
    }
}

impl From<FetchError> for nammy_core::Error {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Timeout => nammy_core::Error::FetchTimeout("request timeout".into()),
            FetchError::Network(msg) => nammy_core::Error::Network(msg),
            other => nammy_core::Error::HttpError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kind() {
        assert_eq!(FetchError::Timeout.kind(), FailureKind::Timeout);
        assert_eq!(FetchError::Network("refused".into()).kind(), FailureKind::Network);
        assert_eq!(FetchError::Other("decode".into()).kind().to_string(), "unknown");
    }

    #[test]
    fn test_into_core_error() {
        let err: nammy_core::Error = FetchError::Timeout.into();
        assert!(err.to_string().starts_with("FETCH_TIMEOUT"));
    }
}
