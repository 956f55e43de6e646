//! Provider client traits and implementations.
//!
//! Each external provider sits behind an `async_trait` so the scheduler and
//! tests can swap in mocks. Implementations map transport failures onto the
//! shared error taxonomy: network errors and 5xx become `SourceUnavailable`,
//! 429 becomes `RateLimited`, well-formed-but-empty bodies become
//! `EmptyPayload`, and decode failures become `PartialData`. Retry and
//! backoff live in the scheduler, never here.

use async_trait::async_trait;
use common::{
    CashFlowQuarter, IncomeQuarter, OptionContract, PredictionMarket, Quote, Result,
    SentimentSample, Transcript,
};
use serde::de::DeserializeOwned;

pub mod fmp;
pub mod polymarket;
pub mod socialdata;

pub use fmp::FmpClient;
pub use polymarket::PolymarketClient;
pub use socialdata::SocialDataClient;

/// Market-data provider (quotes, options, fundamentals, transcripts).
#[async_trait]
pub trait MarketFeed: Send + Sync {
    async fn get_quote(&self, symbol: &str) -> Result<Quote>;

    async fn get_options_chain(&self, symbol: &str) -> Result<Vec<OptionContract>>;

    /// Daily sentiment history, newest first, provider-dependent depth.
    async fn get_sentiment_history(&self, symbol: &str) -> Result<Vec<SentimentSample>>;

    async fn get_cash_flow(&self, symbol: &str, limit: u32) -> Result<Vec<CashFlowQuarter>>;

    async fn get_income_statement(&self, symbol: &str, limit: u32) -> Result<Vec<IncomeQuarter>>;

    async fn get_transcript(&self, symbol: &str, year: i32, quarter: u8) -> Result<Transcript>;
}

/// Prediction-market provider.
#[async_trait]
pub trait PredictionFeed: Send + Sync {
    /// Free-text market search, e.g. `"NVDA"`.
    async fn search_markets(&self, query: &str) -> Result<Vec<PredictionMarket>>;
}

/// Social-media provider producing daily sentiment samples.
#[async_trait]
pub trait SocialFeed: Send + Sync {
    async fn get_sentiment_samples(&self, symbol: &str) -> Result<Vec<SentimentSample>>;
}

/// Map a reqwest response to the error taxonomy and decode the JSON body.
pub(crate) async fn decode_response<T: DeserializeOwned>(
    provider: &str,
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();
    if status.as_u16() == 429 {
        return Err(common::Error::rate_limited(format!("{provider} returned 429")));
    }
    if !status.is_success() {
        return Err(common::Error::source_unavailable(format!(
            "{provider} returned HTTP {status}"
        )));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| common::Error::partial_data(format!("{provider} response decode failed: {e}")))
}

/// Map a transport-level reqwest error (connect, timeout, DNS).
pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> common::Error {
    if err.is_timeout() {
        common::Error::source_unavailable(format!("{provider} request timed out"))
    } else {
        common::Error::source_unavailable(format!("{provider} request failed: {err}"))
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockMarketFeed;
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;
    use common::Error;

    fn quote() -> Quote {
        Quote {
            symbol: "NVDA".to_string(),
            price: 141.0,
            previous_close: 139.5,
            timestamp: chrono::Utc.with_ymd_and_hms(2026, 2, 2, 14, 30, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_scripted_outage_is_retryable() {
        let feed = MockMarketFeed::failing_first(quote(), 2);

        let err = feed.get_quote("NVDA").await.unwrap_err();
        assert_matches!(err, Error::SourceUnavailable(_));
        assert!(err.is_retryable());

        let err = feed.get_quote("NVDA").await.unwrap_err();
        assert_matches!(err, Error::SourceUnavailable(_));

        let quote = feed.get_quote("NVDA").await.unwrap();
        assert_eq!(quote.symbol, "NVDA");
        assert_eq!(feed.call_count(), 3);
    }
}
