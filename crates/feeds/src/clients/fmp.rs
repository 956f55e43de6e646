//! Financial Modeling Prep client.
//!
//! All endpoints route through the stable API base
//! (`https://financialmodelingprep.com/stable/`). The API key is appended as
//! a query parameter on every request and never written to logs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{
    CashFlowQuarter, IncomeQuarter, OptionContract, OptionType, Quote, Result, SentimentSample,
    Transcript,
};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{decode_response, transport_error, MarketFeed};

const PROVIDER: &str = "fmp";

pub struct FmpClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FmpClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| common::Error::config(format!("http client build failed: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{path}", self.base_url);
        debug!(path, "fmp request");

        let mut request = self.client.get(&url).query(&[("apikey", &self.api_key)]);
        for (key, value) in params {
            request = request.query(&[(key, value)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        decode_response(PROVIDER, response).await
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteWire {
    symbol: String,
    price: f64,
    #[serde(default)]
    previous_close: f64,
    /// Unix seconds
    #[serde(default)]
    timestamp: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionWire {
    strike: f64,
    expiration: chrono::NaiveDate,
    #[serde(rename = "type")]
    option_type: OptionType,
    #[serde(default)]
    open_interest: u64,
    #[serde(default)]
    volume: u64,
    #[serde(default)]
    implied_volatility: Option<f64>,
    #[serde(default)]
    bid: Option<f64>,
    #[serde(default)]
    ask: Option<f64>,
    #[serde(default)]
    last_price: Option<f64>,
}

impl From<OptionWire> for OptionContract {
    fn from(w: OptionWire) -> Self {
        OptionContract {
            strike: w.strike,
            expiration: w.expiration,
            option_type: w.option_type,
            open_interest: w.open_interest,
            volume: w.volume,
            implied_volatility: w.implied_volatility,
            bid: w.bid,
            ask: w.ask,
            last_price: w.last_price,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SentimentWire {
    date: chrono::NaiveDate,
    #[serde(default)]
    sentiment: f64,
    #[serde(default)]
    posts: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CashFlowWire {
    date: chrono::NaiveDate,
    #[serde(default)]
    period: String,
    #[serde(default)]
    calendar_year: String,
    #[serde(default)]
    capital_expenditure: f64,
}

#[derive(Debug, Deserialize)]
struct IncomeWire {
    date: chrono::NaiveDate,
    #[serde(default)]
    revenue: f64,
}

#[derive(Debug, Deserialize)]
struct TranscriptWire {
    #[serde(default)]
    symbol: String,
    quarter: u8,
    year: i32,
    #[serde(default)]
    content: String,
}

fn quote_timestamp(unix_secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(unix_secs, 0).unwrap_or_else(Utc::now)
}

#[async_trait]
impl MarketFeed for FmpClient {
    async fn get_quote(&self, symbol: &str) -> Result<Quote> {
        let rows: Vec<QuoteWire> = self
            .get_json("quote", &[("symbol", symbol.to_string())])
            .await?;
        let row = rows.into_iter().next().ok_or_else(|| {
            common::Error::empty_payload(format!("fmp quote returned no rows for {symbol}"))
        })?;
        Ok(Quote {
            symbol: row.symbol,
            price: row.price,
            previous_close: row.previous_close,
            timestamp: quote_timestamp(row.timestamp),
        })
    }

    async fn get_options_chain(&self, symbol: &str) -> Result<Vec<OptionContract>> {
        let rows: Vec<OptionWire> = self
            .get_json("options-chain", &[("symbol", symbol.to_string())])
            .await?;
        if rows.is_empty() {
            return Err(common::Error::empty_payload(format!(
                "fmp options chain empty for {symbol}"
            )));
        }
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_sentiment_history(&self, symbol: &str) -> Result<Vec<SentimentSample>> {
        let rows: Vec<SentimentWire> = self
            .get_json(
                "historical/social-sentiment",
                &[("symbol", symbol.to_string())],
            )
            .await?;
        if rows.is_empty() {
            return Err(common::Error::empty_payload(format!(
                "fmp sentiment history empty for {symbol}"
            )));
        }
        Ok(rows
            .into_iter()
            .map(|r| SentimentSample {
                date: r.date,
                score: r.sentiment,
                mentions: r.posts,
            })
            .collect())
    }

    async fn get_cash_flow(&self, symbol: &str, limit: u32) -> Result<Vec<CashFlowQuarter>> {
        let rows: Vec<CashFlowWire> = self
            .get_json(
                "cash-flow-statement",
                &[
                    ("symbol", symbol.to_string()),
                    ("period", "quarter".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        if rows.is_empty() {
            return Err(common::Error::empty_payload(format!(
                "fmp cash flow empty for {symbol}"
            )));
        }
        Ok(rows
            .into_iter()
            .map(|r| CashFlowQuarter {
                date: r.date,
                period: r.period,
                calendar_year: r.calendar_year,
                capital_expenditure: r.capital_expenditure,
            })
            .collect())
    }

    async fn get_income_statement(&self, symbol: &str, limit: u32) -> Result<Vec<IncomeQuarter>> {
        let rows: Vec<IncomeWire> = self
            .get_json(
                "income-statement",
                &[
                    ("symbol", symbol.to_string()),
                    ("period", "quarter".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        if rows.is_empty() {
            return Err(common::Error::empty_payload(format!(
                "fmp income statement empty for {symbol}"
            )));
        }
        Ok(rows
            .into_iter()
            .map(|r| IncomeQuarter {
                date: r.date,
                revenue: r.revenue,
            })
            .collect())
    }

    async fn get_transcript(&self, symbol: &str, year: i32, quarter: u8) -> Result<Transcript> {
        let rows: Vec<TranscriptWire> = self
            .get_json(
                "earning-call-transcript",
                &[
                    ("symbol", symbol.to_string()),
                    ("year", year.to_string()),
                    ("quarter", quarter.to_string()),
                ],
            )
            .await?;
        let row = rows.into_iter().next().ok_or_else(|| {
            common::Error::empty_payload(format!(
                "fmp transcript empty for {symbol} {year}-Q{quarter}"
            ))
        })?;
        if row.content.is_empty() {
            return Err(common::Error::partial_data(format!(
                "fmp transcript content missing for {symbol} {year}-Q{quarter}"
            )));
        }
        Ok(Transcript {
            symbol: if row.symbol.is_empty() {
                symbol.to_string()
            } else {
                row.symbol
            },
            quarter: row.quarter,
            year: row.year,
            content: row.content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_wire_decodes_fmp_shape() {
        let body = r#"[{"symbol":"NVDA","price":141.25,"previousClose":139.0,"timestamp":1767225600}]"#;
        let rows: Vec<QuoteWire> = serde_json::from_str(body).unwrap();
        assert_eq!(rows[0].symbol, "NVDA");
        assert_eq!(rows[0].previous_close, 139.0);
        assert_eq!(quote_timestamp(rows[0].timestamp).timestamp(), 1767225600);
    }

    #[test]
    fn test_option_wire_decodes_type_tag() {
        let body = r#"[{"strike":140.0,"expiration":"2026-03-20","type":"put","openInterest":100,"volume":50}]"#;
        let rows: Vec<OptionWire> = serde_json::from_str(body).unwrap();
        let contract: OptionContract = rows.into_iter().next().unwrap().into();
        assert_eq!(contract.option_type, OptionType::Put);
        assert_eq!(contract.implied_volatility, None);
        assert_eq!(contract.bid, None);
    }

    #[test]
    fn test_cash_flow_wire_defaults_missing_fields() {
        let body = r#"[{"date":"2025-09-30","capitalExpenditure":-19000000000.0}]"#;
        let rows: Vec<CashFlowWire> = serde_json::from_str(body).unwrap();
        assert_eq!(rows[0].period, "");
        assert!(rows[0].capital_expenditure < 0.0);
    }

    #[test]
    fn test_invalid_timestamp_falls_back_to_now() {
        let ts = quote_timestamp(i64::MAX);
        // Far-future overflow must not panic; fallback is a sane current time.
        assert!(ts.timestamp() > 0);
    }
}
