//! Polymarket Gamma API client.
//!
//! Read-only, no authentication. The Gamma API embeds `outcomePrices` as a
//! JSON-encoded string inside the outer JSON response, so decoding is
//! deliberately lenient: numeric fields may arrive as numbers or strings.

use async_trait::async_trait;
use common::{PredictionMarket, Result};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{decode_response, transport_error, PredictionFeed};

const PROVIDER: &str = "polymarket";

pub struct PolymarketClient {
    client: reqwest::Client,
    base_url: String,
}

impl PolymarketClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| common::Error::config(format!("http client build failed: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketWire {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    question: String,
    #[serde(default)]
    outcome_prices: Option<Value>,
    #[serde(default)]
    volume: Value,
    #[serde(default, rename = "volume24hr")]
    volume_24h: Value,
    #[serde(default)]
    liquidity: Value,
    #[serde(default)]
    active: bool,
    #[serde(default)]
    closed: bool,
}

/// Coerce a JSON number-or-string to f64, defaulting on failure.
fn lenient_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn lenient_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Decode `outcomePrices`, which arrives either as a plain array or as a
/// JSON-encoded string like `"[\"0.72\",\"0.28\"]"`.
fn parse_outcome_prices(raw: &Value) -> Option<Vec<f64>> {
    let array = match raw {
        Value::Array(items) => items.clone(),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(items)) => items,
            _ => return None,
        },
        _ => return None,
    };
    Some(array.iter().map(lenient_f64).collect())
}

impl From<MarketWire> for PredictionMarket {
    fn from(w: MarketWire) -> Self {
        let prices = w.outcome_prices.as_ref().and_then(parse_outcome_prices);
        // Polymarket convention: index 0 = YES, index 1 = NO.
        let yes_price = prices.as_ref().and_then(|p| p.first().copied());
        let no_price = prices.as_ref().and_then(|p| p.get(1).copied());
        PredictionMarket {
            market_id: lenient_string(&w.id),
            question: w.question,
            yes_price,
            no_price,
            volume: lenient_f64(&w.volume),
            volume_24h: lenient_f64(&w.volume_24h),
            liquidity: lenient_f64(&w.liquidity),
            active: w.active,
            closed: w.closed,
        }
    }
}

#[async_trait]
impl PredictionFeed for PolymarketClient {
    async fn search_markets(&self, query: &str) -> Result<Vec<PredictionMarket>> {
        let url = format!("{}/markets", self.base_url);
        debug!(query, "polymarket market search");

        let response = self
            .client
            .get(&url)
            .query(&[("_q", query)])
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        let rows: Vec<MarketWire> = decode_response(PROVIDER, response).await?;
        if rows.is_empty() {
            return Err(common::Error::empty_payload(format!(
                "polymarket returned no markets for {query}"
            )));
        }
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_prices_as_json_string() {
        let raw = Value::String(r#"["0.72","0.28"]"#.to_string());
        assert_eq!(parse_outcome_prices(&raw), Some(vec![0.72, 0.28]));
    }

    #[test]
    fn test_outcome_prices_as_plain_array() {
        let raw: Value = serde_json::json!([0.6, 0.4]);
        assert_eq!(parse_outcome_prices(&raw), Some(vec![0.6, 0.4]));
    }

    #[test]
    fn test_outcome_prices_malformed() {
        assert_eq!(parse_outcome_prices(&Value::String("nope".into())), None);
        assert_eq!(parse_outcome_prices(&Value::Null), None);
    }

    #[test]
    fn test_market_wire_conversion() {
        let body = r#"{
            "id": 12345,
            "question": "NVDA closes above $140 on Feb 23?",
            "outcomePrices": "[\"0.55\",\"0.45\"]",
            "volume": "125000.5",
            "volume24hr": 4000,
            "liquidity": "9000",
            "active": true,
            "closed": false
        }"#;
        let wire: MarketWire = serde_json::from_str(body).unwrap();
        let market: PredictionMarket = wire.into();
        assert_eq!(market.market_id, "12345");
        assert_eq!(market.yes_price, Some(0.55));
        assert_eq!(market.no_price, Some(0.45));
        assert_eq!(market.volume, 125000.5);
        assert_eq!(market.volume_24h, 4000.0);
        assert!(market.active);
    }

    #[test]
    fn test_missing_outcome_prices_yields_none() {
        let body = r#"{"id":"x","question":"Will NVDA beat earnings?","active":true}"#;
        let wire: MarketWire = serde_json::from_str(body).unwrap();
        let market: PredictionMarket = wire.into();
        assert_eq!(market.yes_price, None);
        assert_eq!(market.volume, 0.0);
    }
}
