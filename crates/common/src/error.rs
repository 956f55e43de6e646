//! Error taxonomy shared across MarketPulse crates
//!
//! Source-level failures (`SourceUnavailable`, `RateLimited`, `EmptyPayload`,
//! `PartialData`) are isolated to the refresh job that produced them and never
//! cross job boundaries. Engines treat empty or partial input as a neutral
//! result and never surface these past their boundary.

use thiserror::Error;

/// Error type used across MarketPulse crates
#[derive(Error, Debug)]
pub enum Error {
    /// Provider is unreachable or returned a server error
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Provider answered with HTTP 429
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Provider answered correctly but the payload was empty
    #[error("Empty payload: {0}")]
    EmptyPayload(String),

    /// Payload was present but missing expected fields
    #[error("Partial data: {0}")]
    PartialData(String),

    /// A numeric computation failed to produce a result
    #[error("Computation error: {0}")]
    Computation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using the common Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a source-unavailable error
    pub fn source_unavailable(msg: impl Into<String>) -> Self {
        Self::SourceUnavailable(msg.into())
    }

    /// Create a rate-limited error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create an empty-payload error
    pub fn empty_payload(msg: impl Into<String>) -> Self {
        Self::EmptyPayload(msg.into())
    }

    /// Create a partial-data error
    pub fn partial_data(msg: impl Into<String>) -> Self {
        Self::PartialData(msg.into())
    }

    /// Create a computation error
    pub fn computation(msg: impl Into<String>) -> Self {
        Self::Computation(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True when the failure is worth retrying within the same tick
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SourceUnavailable(_) | Self::RateLimited(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(Error::source_unavailable("503").is_retryable());
        assert!(Error::rate_limited("429").is_retryable());
        assert!(!Error::empty_payload("no rows").is_retryable());
        assert!(!Error::partial_data("missing strike").is_retryable());
    }

    #[test]
    fn test_display_messages() {
        let err = Error::rate_limited("quote endpoint");
        assert_eq!(err.to_string(), "Rate limited: quote endpoint");
    }
}
