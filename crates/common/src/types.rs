//! Domain types shared between the feeds, the cache, and the engines
//!
//! Everything here is a plain data carrier: the feed clients decode provider
//! responses into these types, the scheduler stores them in the cache as a
//! [`Payload`], and the engines consume them without further I/O.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Option type (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

/// Real-time quote for the tracked underlying
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub previous_close: f64,
    pub timestamp: DateTime<Utc>,
}

/// A single option contract from the provider chain snapshot.
///
/// Recomputed on every refresh, never persisted. `implied_volatility` is
/// optional; the GEX engine recovers it via bisection when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionContract {
    pub strike: f64,
    pub expiration: NaiveDate,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub open_interest: u64,
    pub volume: u64,
    pub implied_volatility: Option<f64>,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub last_price: Option<f64>,
}

impl OptionContract {
    /// Best available market price: bid/ask mid preferred, then last trade.
    pub fn market_price(&self) -> Option<f64> {
        match (self.bid, self.ask) {
            (Some(b), Some(a)) if b > 0.0 && a > 0.0 => Some((b + a) / 2.0),
            _ => self.last_price.filter(|p| *p > 0.0),
        }
    }
}

/// One day of social sentiment for a symbol.
///
/// `score` is normalized to [0, 1] by the feed client regardless of source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentSample {
    pub date: NaiveDate,
    pub score: f64,
    pub mentions: u64,
}

/// One quarter of a company's cash-flow statement.
///
/// `capital_expenditure` carries the provider's sign convention; the CapEx
/// engine normalizes it to a positive magnitude.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowQuarter {
    pub date: NaiveDate,
    pub period: String,
    pub calendar_year: String,
    pub capital_expenditure: f64,
}

/// One quarter of a company's income statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeQuarter {
    pub date: NaiveDate,
    pub revenue: f64,
}

/// An earnings-call transcript for one company quarter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub symbol: String,
    pub quarter: u8,
    pub year: i32,
    pub content: String,
}

/// A binary prediction market from the prediction provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionMarket {
    pub market_id: String,
    pub question: String,
    pub yes_price: Option<f64>,
    pub no_price: Option<f64>,
    pub volume: f64,
    pub volume_24h: f64,
    pub liquidity: f64,
    pub active: bool,
    pub closed: bool,
}

/// Typed payload stored in the TTL cache.
///
/// One variant per data category; the scheduler writes these and the
/// presentation layer reads them back for the engines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    Quote(Quote),
    Options(Vec<OptionContract>),
    Sentiment(Vec<SentimentSample>),
    CashFlow(Vec<CashFlowQuarter>),
    Income(Vec<IncomeQuarter>),
    Transcripts(Vec<Transcript>),
    Prediction(Vec<PredictionMarket>),
}

impl Payload {
    /// Category tag used in cache keys and log lines
    pub fn category(&self) -> &'static str {
        match self {
            Self::Quote(_) => "price",
            Self::Options(_) => "options",
            Self::Sentiment(_) => "sentiment",
            Self::CashFlow(_) => "cashflow",
            Self::Income(_) => "income",
            Self::Transcripts(_) => "transcripts",
            Self::Prediction(_) => "prediction",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(bid: Option<f64>, ask: Option<f64>, last: Option<f64>) -> OptionContract {
        OptionContract {
            strike: 100.0,
            expiration: NaiveDate::from_ymd_opt(2027, 1, 15).unwrap(),
            option_type: OptionType::Call,
            open_interest: 10,
            volume: 5,
            implied_volatility: None,
            bid,
            ask,
            last_price: last,
        }
    }

    #[test]
    fn test_market_price_prefers_mid() {
        let c = contract(Some(2.0), Some(4.0), Some(10.0));
        assert_eq!(c.market_price(), Some(3.0));
    }

    #[test]
    fn test_market_price_falls_back_to_last() {
        let c = contract(Some(0.0), Some(4.0), Some(10.0));
        assert_eq!(c.market_price(), Some(10.0));
    }

    #[test]
    fn test_market_price_none_when_unpriced() {
        let c = contract(None, None, Some(0.0));
        assert_eq!(c.market_price(), None);
    }

    #[test]
    fn test_payload_category() {
        let p = Payload::Options(vec![]);
        assert_eq!(p.category(), "options");
    }
}
