//! Prediction-market heatmap engine
//!
//! Builds a probability heatmap from binary prediction markets. Markets
//! whose question names a dollar price level become heatmap rows; the rest
//! are kept as supplementary signals (earnings beat/miss and similar).

use chrono::{DateTime, Utc};
use common::PredictionMarket;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Directional phrasings that mark a question as a price-level bet. A dollar
/// amount alone is not enough ("$1 trillion market cap" is not a level).
const PRICE_LEVEL_KEYWORDS: &[&str] = &[
    "closes above",
    "close above",
    "above $",
    "hit $",
    "hits $",
    "reach $",
    "reaches $",
    "exceed $",
    "exceeds $",
    "over $",
];

const FIFTY_PERCENT: f64 = 0.50;

fn dollar_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$(\d+(?:\.\d+)?)").expect("static regex"))
}

/// One price-level market, a row of the heatmap.
#[derive(Debug, Clone, Serialize)]
pub struct PriceLevel {
    pub strike: f64,
    pub question: String,
    pub yes_price: f64,
    pub no_price: f64,
    pub volume: f64,
    pub volume_24h: f64,
    pub liquidity: f64,
    pub market_id: String,
}

/// Non-price-level market kept as a supplementary signal.
#[derive(Debug, Clone, Serialize)]
pub struct SupplementarySignal {
    pub question: String,
    pub yes_price: f64,
    pub volume: f64,
    pub market_id: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PredictionKeyLevels {
    /// Strike with the highest YES price
    pub max_conviction: Option<f64>,
    /// Strike whose YES price is closest to 0.50
    pub fifty_percent_level: Option<f64>,
    /// Strike with the lowest YES price above zero
    pub low_conviction: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionHeatmap {
    /// Price-level markets, ascending by strike
    pub price_levels: Vec<PriceLevel>,
    pub key_levels: PredictionKeyLevels,
    pub supplementary: Vec<SupplementarySignal>,
    pub total_volume: f64,
    /// Active markets seen, including supplementary
    pub market_count: usize,
    pub last_updated: DateTime<Utc>,
}

fn extract_strike(question: &str) -> Option<f64> {
    let caps = dollar_pattern().captures(question)?;
    caps.get(1)?.as_str().parse().ok()
}

fn is_price_level_question(question: &str, strike: Option<f64>) -> bool {
    if strike.is_none() {
        return false;
    }
    let lower = question.to_lowercase();
    PRICE_LEVEL_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

fn compute_key_levels(price_levels: &[PriceLevel]) -> PredictionKeyLevels {
    if price_levels.is_empty() {
        return PredictionKeyLevels::default();
    }

    let max_conviction = price_levels
        .iter()
        .max_by(|a, b| a.yes_price.total_cmp(&b.yes_price))
        .map(|m| m.strike);

    let fifty_percent_level = price_levels
        .iter()
        .min_by(|a, b| {
            (a.yes_price - FIFTY_PERCENT)
                .abs()
                .total_cmp(&(b.yes_price - FIFTY_PERCENT).abs())
        })
        .map(|m| m.strike);

    let low_conviction = price_levels
        .iter()
        .filter(|m| m.yes_price > 0.0)
        .min_by(|a, b| a.yes_price.total_cmp(&b.yes_price))
        .map(|m| m.strike);

    PredictionKeyLevels {
        max_conviction,
        fifty_percent_level,
        low_conviction,
    }
}

/// Build the probability heatmap from raw prediction markets.
///
/// Inactive or closed markets are dropped. A market without a YES price, or
/// without a directional price-level question, lands in `supplementary`.
pub fn analyze(markets: &[PredictionMarket], as_of: DateTime<Utc>) -> PredictionHeatmap {
    let mut price_levels: Vec<PriceLevel> = Vec::new();
    let mut supplementary: Vec<SupplementarySignal> = Vec::new();
    let mut total_volume = 0.0;
    let mut active_count = 0usize;

    for market in markets {
        if !market.active || market.closed {
            debug!(market_id = %market.market_id, "skipping inactive or closed market");
            continue;
        }
        active_count += 1;
        total_volume += market.volume;

        let Some(yes_price) = market.yes_price else {
            supplementary.push(SupplementarySignal {
                question: market.question.clone(),
                yes_price: 0.0,
                volume: market.volume,
                market_id: market.market_id.clone(),
            });
            continue;
        };

        let strike = extract_strike(&market.question);
        if is_price_level_question(&market.question, strike) {
            let strike = strike.unwrap_or_default();
            price_levels.push(PriceLevel {
                strike,
                question: market.question.clone(),
                yes_price,
                no_price: market.no_price.unwrap_or(1.0 - yes_price),
                volume: market.volume,
                volume_24h: market.volume_24h,
                liquidity: market.liquidity,
                market_id: market.market_id.clone(),
            });
        } else {
            supplementary.push(SupplementarySignal {
                question: market.question.clone(),
                yes_price,
                volume: market.volume,
                market_id: market.market_id.clone(),
            });
        }
    }

    price_levels.sort_by(|a, b| a.strike.total_cmp(&b.strike));
    let key_levels = compute_key_levels(&price_levels);

    info!(
        active = active_count,
        price_levels = price_levels.len(),
        supplementary = supplementary.len(),
        total_volume,
        "prediction heatmap assembled"
    );

    PredictionHeatmap {
        price_levels,
        key_levels,
        supplementary,
        total_volume,
        market_count: active_count,
        last_updated: as_of,
    }
}
