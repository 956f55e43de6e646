//! Job catalog: builds the refresh job list from configuration.
//!
//! Each job's interval matches its cache TTL so entries are rewritten just
//! as they expire. Cache keys are `category:SYMBOL` (`price:NVDA`,
//! `cashflow:MSFT`); the transcripts job writes a single combined entry.

use chrono::{Datelike, NaiveDate, Utc};
use common::{Payload, Result};
use config::AppConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::clients::{MarketFeed, PredictionFeed, SocialFeed};
use crate::scheduler::JobSpec;

const FUNDAMENTALS_QUARTERS: u32 = 8;

/// Most recent fully reported quarter as of `today`: the calendar quarter
/// before the current one.
pub fn latest_reported_quarter(today: NaiveDate) -> (i32, u8) {
    let current = (today.month0() / 3 + 1) as u8;
    if current == 1 {
        (today.year() - 1, 4)
    } else {
        (today.year(), current - 1)
    }
}

/// Assemble the full job list. The social job is omitted when no SocialData
/// client is configured.
pub fn build_jobs(
    config: &AppConfig,
    market: Arc<dyn MarketFeed>,
    prediction: Arc<dyn PredictionFeed>,
    social: Option<Arc<dyn SocialFeed>>,
) -> Vec<JobSpec> {
    let primary = config.symbols.primary.clone();
    let hyperscalers = config.symbols.hyperscalers.clone();
    let ttl = &config.cache_ttl;

    let mut jobs = Vec::new();

    {
        let market = Arc::clone(&market);
        let symbol = primary.clone();
        jobs.push(JobSpec {
            name: format!("price:{symbol}"),
            interval: Duration::from_secs(ttl.price),
            ttl: Duration::from_secs(ttl.price),
            fetch: Arc::new(move || {
                let market = Arc::clone(&market);
                let symbol = symbol.clone();
                Box::pin(async move {
                    let quote = market.get_quote(&symbol).await?;
                    Ok(vec![(format!("price:{symbol}"), Payload::Quote(quote))])
                })
            }),
        });
    }

    {
        let market = Arc::clone(&market);
        let symbol = primary.clone();
        jobs.push(JobSpec {
            name: format!("options:{symbol}"),
            interval: Duration::from_secs(ttl.options),
            ttl: Duration::from_secs(ttl.options),
            fetch: Arc::new(move || {
                let market = Arc::clone(&market);
                let symbol = symbol.clone();
                Box::pin(async move {
                    let chain = market.get_options_chain(&symbol).await?;
                    Ok(vec![(format!("options:{symbol}"), Payload::Options(chain))])
                })
            }),
        });
    }

    {
        let market = Arc::clone(&market);
        let symbol = primary.clone();
        jobs.push(JobSpec {
            name: format!("sentiment:{symbol}"),
            interval: Duration::from_secs(ttl.sentiment),
            ttl: Duration::from_secs(ttl.sentiment),
            fetch: Arc::new(move || {
                let market = Arc::clone(&market);
                let symbol = symbol.clone();
                Box::pin(async move {
                    let samples = market.get_sentiment_history(&symbol).await?;
                    Ok(vec![(
                        format!("sentiment:{symbol}"),
                        Payload::Sentiment(samples),
                    )])
                })
            }),
        });
    }

    if let Some(social) = social {
        let symbol = primary.clone();
        jobs.push(JobSpec {
            name: format!("social:{symbol}"),
            interval: Duration::from_secs(ttl.social),
            ttl: Duration::from_secs(ttl.social),
            fetch: Arc::new(move || {
                let social = Arc::clone(&social);
                let symbol = symbol.clone();
                Box::pin(async move {
                    let samples = social.get_sentiment_samples(&symbol).await?;
                    Ok(vec![(format!("social:{symbol}"), Payload::Sentiment(samples))])
                })
            }),
        });
    }

    {
        let symbol = primary.clone();
        jobs.push(JobSpec {
            name: format!("prediction:{symbol}"),
            interval: Duration::from_secs(ttl.prediction),
            ttl: Duration::from_secs(ttl.prediction),
            fetch: Arc::new(move || {
                let prediction = Arc::clone(&prediction);
                let symbol = symbol.clone();
                Box::pin(async move {
                    let markets = prediction.search_markets(&symbol).await?;
                    Ok(vec![(
                        format!("prediction:{symbol}"),
                        Payload::Prediction(markets),
                    )])
                })
            }),
        });
    }

    {
        let market = Arc::clone(&market);
        let tickers = hyperscalers.clone();
        jobs.push(JobSpec {
            name: "fundamentals".to_string(),
            interval: Duration::from_secs(ttl.fundamentals),
            ttl: Duration::from_secs(ttl.fundamentals),
            fetch: Arc::new(move || {
                let market = Arc::clone(&market);
                let tickers = tickers.clone();
                Box::pin(async move { fetch_fundamentals(market, tickers).await })
            }),
        });
    }

    {
        let mut symbols = vec![primary];
        symbols.extend(hyperscalers);
        jobs.push(JobSpec {
            name: "transcripts".to_string(),
            interval: Duration::from_secs(ttl.transcripts),
            ttl: Duration::from_secs(ttl.transcripts),
            fetch: Arc::new(move || {
                let market = Arc::clone(&market);
                let symbols = symbols.clone();
                Box::pin(async move { fetch_transcripts(market, symbols).await })
            }),
        });
    }

    jobs
}

/// Fetch cash-flow and income statements per ticker. A ticker failure is
/// logged and skipped; the job only fails when nothing was fetched at all.
async fn fetch_fundamentals(
    market: Arc<dyn MarketFeed>,
    tickers: Vec<String>,
) -> Result<Vec<(String, Payload)>> {
    let mut pairs = Vec::new();
    let mut last_err = None;

    for ticker in &tickers {
        match market.get_cash_flow(ticker, FUNDAMENTALS_QUARTERS).await {
            Ok(quarters) => pairs.push((format!("cashflow:{ticker}"), Payload::CashFlow(quarters))),
            Err(e) => {
                warn!(ticker = %ticker, "cash flow fetch failed: {e}");
                last_err = Some(e);
            }
        }
        match market.get_income_statement(ticker, FUNDAMENTALS_QUARTERS).await {
            Ok(quarters) => pairs.push((format!("income:{ticker}"), Payload::Income(quarters))),
            Err(e) => {
                warn!(ticker = %ticker, "income statement fetch failed: {e}");
                last_err = Some(e);
            }
        }
    }

    match (pairs.is_empty(), last_err) {
        (true, Some(e)) => Err(e),
        (true, None) => Err(common::Error::empty_payload("no fundamentals fetched")),
        (false, _) => Ok(pairs),
    }
}

/// Fetch the latest reported quarter's transcript for every tracked symbol
/// into one combined payload. Individual misses are tolerated.
async fn fetch_transcripts(
    market: Arc<dyn MarketFeed>,
    symbols: Vec<String>,
) -> Result<Vec<(String, Payload)>> {
    let (year, quarter) = latest_reported_quarter(Utc::now().date_naive());
    let mut transcripts = Vec::new();
    let mut last_err = None;

    for symbol in &symbols {
        match market.get_transcript(symbol, year, quarter).await {
            Ok(t) => transcripts.push(t),
            Err(e) => {
                warn!(symbol = %symbol, year, quarter, "transcript fetch failed: {e}");
                last_err = Some(e);
            }
        }
    }

    if transcripts.is_empty() {
        return Err(last_err
            .unwrap_or_else(|| common::Error::empty_payload("no transcripts fetched")));
    }
    Ok(vec![(
        "transcripts:all".to_string(),
        Payload::Transcripts(transcripts),
    )])
}
