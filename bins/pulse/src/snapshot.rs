//! Analytics snapshot assembly.
//!
//! This is the integration point for any presentation layer: it reads the
//! current cache state, runs each engine over the cached payloads, and
//! stamps every result with the *oldest* input `fetched_at` so stale inputs
//! surface as stale outputs. A cache miss leaves that category `None`
//! ("temporarily unavailable") and never triggers a live fetch.

use cache::{Cached, TtlCache};
use chrono::{DateTime, Utc};
use common::Payload;
use config::AppConfig;
use engines::{
    capex, gex, prediction, sentiment, transcript, unusual, CapexReport, GexParams, GexProfile,
    KeywordLexicon, PredictionHeatmap, SentimentParams, SentimentSignal, TranscriptReport,
    UnusualActivity, UnusualParams,
};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Serialize)]
pub struct AnalyticsSnapshot {
    pub gex: Option<GexProfile>,
    pub unusual: Option<UnusualActivity>,
    pub sentiment: Option<SentimentSignal>,
    pub capex: Option<CapexReport>,
    pub transcripts: Option<TranscriptReport>,
    pub prediction: Option<PredictionHeatmap>,
    pub generated_at: DateTime<Utc>,
}

impl AnalyticsSnapshot {
    /// One-line availability summary for the periodic log.
    pub fn summary(&self) -> String {
        fn mark(present: bool) -> &'static str {
            if present {
                "ok"
            } else {
                "unavailable"
            }
        }
        format!(
            "gex={} unusual={} sentiment={} capex={} transcripts={} prediction={}",
            mark(self.gex.is_some()),
            mark(self.unusual.is_some()),
            mark(self.sentiment.is_some()),
            mark(self.capex.is_some()),
            mark(self.transcripts.is_some()),
            mark(self.prediction.is_some()),
        )
    }
}

fn oldest(timestamps: &[DateTime<Utc>]) -> DateTime<Utc> {
    timestamps.iter().min().copied().unwrap_or_else(Utc::now)
}

/// Run every engine over the current cache contents.
pub fn assemble(cache: &TtlCache<Payload>, config: &AppConfig) -> AnalyticsSnapshot {
    let primary = &config.symbols.primary;

    let quote = match cache.get(&format!("price:{primary}")) {
        Some(Cached {
            value: Payload::Quote(q),
            fetched_at,
        }) => Some((q, fetched_at)),
        _ => None,
    };
    let options = match cache.get(&format!("options:{primary}")) {
        Some(Cached {
            value: Payload::Options(chain),
            fetched_at,
        }) => Some((chain, fetched_at)),
        _ => None,
    };

    // Options analytics need both the chain and a spot price.
    let (gex_result, unusual_result) = match (&quote, &options) {
        (Some((quote, quote_at)), Some((chain, chain_at))) => {
            let as_of = oldest(&[*quote_at, *chain_at]);
            let gex_params = GexParams {
                risk_free_rate: config.analytics.risk_free_rate,
            };
            let unusual_params = UnusualParams {
                ratio_threshold: config.analytics.unusual_ratio_threshold,
                min_volume: config.analytics.unusual_min_volume,
                max_results: config.analytics.unusual_max_results,
            };
            (
                Some(gex::compute_gex(
                    chain,
                    quote.price,
                    as_of.date_naive(),
                    &gex_params,
                    as_of,
                )),
                Some(unusual::scan(chain, &unusual_params, as_of)),
            )
        }
        _ => {
            debug!("quote or options chain unavailable, skipping options analytics");
            (None, None)
        }
    };

    // Social samples take precedence over the provider's sentiment history.
    let sentiment_result = cache
        .get(&format!("social:{primary}"))
        .or_else(|| cache.get(&format!("sentiment:{primary}")))
        .and_then(|cached| match cached.value {
            Payload::Sentiment(samples) => {
                let params = SentimentParams {
                    window_days: config.analytics.sentiment_days,
                    spike_multiplier: config.analytics.volume_spike_multiplier,
                };
                Some(sentiment::process(&samples, &params, cached.fetched_at))
            }
            _ => None,
        });

    let capex_result = assemble_capex(cache, config);

    let transcripts_result = match cache.get("transcripts:all") {
        Some(Cached {
            value: Payload::Transcripts(list),
            fetched_at,
        }) => {
            let lexicon = KeywordLexicon::new(&config.keywords.hardware, &config.keywords.category);
            Some(transcript::analyze(
                &list,
                &lexicon,
                config.analytics.top_keywords,
                fetched_at,
            ))
        }
        _ => None,
    };

    let prediction_result = match cache.get(&format!("prediction:{primary}")) {
        Some(Cached {
            value: Payload::Prediction(markets),
            fetched_at,
        }) => Some(prediction::analyze(&markets, fetched_at)),
        _ => None,
    };

    AnalyticsSnapshot {
        gex: gex_result,
        unusual: unusual_result,
        sentiment: sentiment_result,
        capex: capex_result,
        transcripts: transcripts_result,
        prediction: prediction_result,
        generated_at: Utc::now(),
    }
}

/// Build the capex report from whichever hyperscalers have both statements
/// cached; None when no company has usable data.
fn assemble_capex(cache: &TtlCache<Payload>, config: &AppConfig) -> Option<CapexReport> {
    let params = capex::CapexParams::default();
    let mut companies = Vec::new();
    let mut inputs_at = Vec::new();

    for ticker in &config.symbols.hyperscalers {
        let cash_flow = match cache.get(&format!("cashflow:{ticker}")) {
            Some(Cached {
                value: Payload::CashFlow(rows),
                fetched_at,
            }) => (rows, fetched_at),
            _ => continue,
        };
        let income = match cache.get(&format!("income:{ticker}")) {
            Some(Cached {
                value: Payload::Income(rows),
                fetched_at,
            }) => (rows, fetched_at),
            _ => continue,
        };
        inputs_at.push(cash_flow.1);
        inputs_at.push(income.1);
        companies.push(capex::company_series(ticker, &cash_flow.0, &income.0, &params));
    }

    if companies.is_empty() {
        return None;
    }
    Some(capex::build_report(companies, oldest(&inputs_at)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use common::{Quote, SentimentSample};
    use std::time::Duration;

    fn test_config() -> AppConfig {
        config::generate_default_config()
    }

    fn quote_payload() -> Payload {
        Payload::Quote(Quote {
            symbol: "NVDA".to_string(),
            price: 141.0,
            previous_close: 139.5,
            timestamp: Utc.with_ymd_and_hms(2026, 2, 2, 14, 30, 0).unwrap(),
        })
    }

    #[test]
    fn test_empty_cache_yields_all_unavailable() {
        let cache = TtlCache::new();
        let snapshot = assemble(&cache, &test_config());
        assert!(snapshot.gex.is_none());
        assert!(snapshot.unusual.is_none());
        assert!(snapshot.sentiment.is_none());
        assert!(snapshot.capex.is_none());
        assert!(snapshot.transcripts.is_none());
        assert!(snapshot.prediction.is_none());
        assert!(snapshot.summary().contains("gex=unavailable"));
    }

    #[test]
    fn test_quote_without_options_skips_options_analytics() {
        let cache = TtlCache::new();
        cache.set("price:NVDA", quote_payload(), Duration::from_secs(60));
        let snapshot = assemble(&cache, &test_config());
        assert!(snapshot.gex.is_none());
        assert!(snapshot.unusual.is_none());
    }

    #[test]
    fn test_sentiment_stamped_with_cache_freshness() {
        let cache = TtlCache::new();
        let samples = vec![SentimentSample {
            date: chrono::NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
            score: 0.7,
            mentions: 500,
        }];
        cache.set(
            "social:NVDA",
            Payload::Sentiment(samples),
            Duration::from_secs(60),
        );
        let written = cache.get("social:NVDA").unwrap().fetched_at;

        let snapshot = assemble(&cache, &test_config());
        let sentiment = snapshot.sentiment.expect("sentiment available");
        assert_eq!(sentiment.last_updated, written);
    }

    #[test]
    fn test_options_analytics_use_oldest_input_freshness() {
        let cache = TtlCache::new();
        cache.set("price:NVDA", quote_payload(), Duration::from_secs(60));
        std::thread::sleep(std::time::Duration::from_millis(5));
        cache.set(
            "options:NVDA",
            Payload::Options(Vec::new()),
            Duration::from_secs(60),
        );

        let quote_at = cache.get("price:NVDA").unwrap().fetched_at;
        let snapshot = assemble(&cache, &test_config());
        let gex = snapshot.gex.expect("gex computed");
        // Quote was written first, so it is the stalest input.
        assert_eq!(gex.last_updated, quote_at);
    }

    #[test]
    fn test_capex_requires_both_statements() {
        let cache = TtlCache::new();
        cache.set(
            "cashflow:MSFT",
            Payload::CashFlow(Vec::new()),
            Duration::from_secs(60),
        );
        // Income missing: MSFT is skipped, and with no usable company the
        // whole category is unavailable.
        let snapshot = assemble(&cache, &test_config());
        assert!(snapshot.capex.is_none());
    }
}
