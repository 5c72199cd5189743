//! Error taxonomy for market data requests

use thiserror::Error;

/// Failure of a market data request.
///
/// Every variant is considered transient: the caller keeps whatever it displayed
/// before and offers a retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Upstream answered with a non-success status, usually throttling
    #[error("HTTP {status}: rate limit exceeded")]
    RateLimited { status: u16 },

    /// Request never produced a response
    #[error("Network error: {0}")]
    Transport(String),

    /// Response body was not the expected JSON
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Short message suitable for the error panel.
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::RateLimited { .. } => "Rate limit exceeded. Please wait a moment.",
            FetchError::Transport(_) => "Could not reach the market data service.",
            FetchError::Decode(_) => "Market data service returned an unexpected response.",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let err = FetchError::RateLimited { status: 429 };
        assert_eq!(err.user_message(), "Rate limit exceeded. Please wait a moment.");
        assert_eq!(err.to_string(), "HTTP 429: rate limit exceeded");

        let err = FetchError::Decode("expected value".to_string());
        assert_eq!(err.to_string(), "Invalid response: expected value");
        assert!(!err.user_message().is_empty());
    }
}
