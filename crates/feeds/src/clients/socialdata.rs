//! SocialData.tools client.
//!
//! Searches Twitter/X for cashtag mentions and folds the raw tweets into
//! daily sentiment samples: per tweet, a bullish/bearish keyword score is
//! squashed to [-1, +1] and weighted by engagement, then each day's weighted
//! average is mapped to a [0, 1] score with the tweet count as mentions.
//!
//! Auth is a Bearer token; the key is sent in the Authorization header and
//! never logged.

use async_trait::async_trait;
use chrono::NaiveDate;
use common::{Result, SentimentSample};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

use super::{decode_response, transport_error, SocialFeed};

const PROVIDER: &str = "socialdata";

const BULLISH_WORDS: &[&str] = &[
    "bullish", "buy", "long", "calls", "moon", "breakout", "rally", "upgrade",
];
const BEARISH_WORDS: &[&str] = &[
    "bearish", "sell", "short", "puts", "crash", "dump", "downgrade", "overvalued",
];

pub struct SocialDataClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SocialDataClient {
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
}

#[derive(Debug, Deserialize)]
struct SearchWire {
    #[serde(default)]
    tweets: Vec<TweetWire>,
}

#[derive(Debug, Deserialize)]
struct TweetWire {
    #[serde(default)]
    full_text: String,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    favorite_count: u64,
    #[serde(default)]
    retweet_count: u64,
}

/// Bullish hits minus bearish hits over whitespace-split lowercase words.
fn keyword_score(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let mut score = 0i64;
    for word in lower.split_whitespace() {
        let word = word.trim_matches(|c: char| !c.is_alphanumeric());
        if BULLISH_WORDS.contains(&word) {
            score += 1;
        } else if BEARISH_WORDS.contains(&word) {
            score -= 1;
        }
    }
    score as f64
}

/// Squash a raw keyword difference into [-1, +1]; zero stays exactly zero.
fn normalize_score(raw: f64) -> f64 {
    raw.tanh()
}

/// Engagement weight 1 + log2(1 + likes + retweets); floor of 1.0.
fn engagement_weight(likes: u64, retweets: u64) -> f64 {
    1.0 + (1.0 + (likes + retweets) as f64).log2()
}

fn tweet_date(created_at: &str) -> Option<NaiveDate> {
    for format in ["%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(created_at, format) {
            return Some(dt.date());
        }
        if let Ok(d) = NaiveDate::parse_from_str(created_at, format) {
            return Some(d);
        }
    }
    None
}

#[derive(Default)]
struct DayBucket {
    weighted_score_sum: f64,
    weight_sum: f64,
    count: u64,
}

/// Fold raw tweets into one sentiment sample per day, ascending by date.
/// Weighted average sits in [-1, +1] and is mapped to [0, 1]; a day with no
/// usable weight scores neutral 0.5.
fn aggregate_by_day(tweets: &[TweetWire]) -> Vec<SentimentSample> {
    let mut days: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();

    for tweet in tweets {
        let Some(date) = tweet_date(&tweet.created_at) else {
            continue;
        };
        let norm = normalize_score(keyword_score(&tweet.full_text));
        let weight = engagement_weight(tweet.favorite_count, tweet.retweet_count);

        let bucket = days.entry(date).or_default();
        bucket.weighted_score_sum += norm * weight;
        bucket.weight_sum += weight;
        bucket.count += 1;
    }

    days.into_iter()
        .map(|(date, bucket)| {
            let avg = if bucket.weight_sum > 0.0 {
                bucket.weighted_score_sum / bucket.weight_sum
            } else {
                0.0
            };
            SentimentSample {
                date,
                score: (avg + 1.0) / 2.0,
                mentions: bucket.count,
            }
        })
        .collect()
}

#[async_trait]
impl SocialFeed for SocialDataClient {
    async fn get_sentiment_samples(&self, symbol: &str) -> Result<Vec<SentimentSample>> {
        let url = format!("{}/twitter/search", self.base_url);
        let query = format!("${symbol}");
        debug!(symbol, "socialdata tweet search");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(&[("query", query.as_str()), ("type", "Latest")])
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        let wire: SearchWire = decode_response(PROVIDER, response).await?;
        if wire.tweets.is_empty() {
            return Err(common::Error::empty_payload(format!(
                "socialdata returned no tweets for {symbol}"
            )));
        }
        Ok(aggregate_by_day(&wire.tweets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tweet(text: &str, created_at: &str, likes: u64, retweets: u64) -> TweetWire {
        TweetWire {
            full_text: text.to_string(),
            created_at: created_at.to_string(),
            favorite_count: likes,
            retweet_count: retweets,
        }
    }

    #[test]
    fn test_keyword_score() {
        assert_eq!(keyword_score("NVDA calls to the moon, very bullish"), 3.0);
        assert_eq!(keyword_score("time to sell and go short"), -2.0);
        assert_eq!(keyword_score("earnings next week"), 0.0);
    }

    #[test]
    fn test_punctuation_stripped_before_matching() {
        assert_eq!(keyword_score("Bullish! Buy."), 2.0);
    }

    #[test]
    fn test_normalize_zero_stays_zero() {
        assert_eq!(normalize_score(0.0), 0.0);
        assert!(normalize_score(1.0) > 0.7);
        assert!(normalize_score(3.0) > 0.99);
    }

    #[test]
    fn test_engagement_weight_floor() {
        assert_eq!(engagement_weight(0, 0), 1.0);
        assert!(engagement_weight(100, 20) > engagement_weight(1, 0));
    }

    #[test]
    fn test_tweet_date_formats() {
        assert!(tweet_date("2026-02-02T14:30:00Z").is_some());
        assert!(tweet_date("2026-02-02").is_some());
        assert!(tweet_date("not a date").is_none());
    }

    #[test]
    fn test_aggregate_groups_by_day_ascending() {
        let tweets = vec![
            tweet("bullish calls", "2026-02-02T10:00:00Z", 10, 2),
            tweet("sell everything", "2026-02-01T09:00:00Z", 0, 0),
            tweet("moon soon", "2026-02-02T12:00:00Z", 5, 1),
        ];
        let samples = aggregate_by_day(&tweets);
        assert_eq!(samples.len(), 2);
        assert!(samples[0].date < samples[1].date);
        assert_eq!(samples[0].mentions, 1);
        assert_eq!(samples[1].mentions, 2);
        // Bearish day below neutral, bullish day above.
        assert!(samples[0].score < 0.5);
        assert!(samples[1].score > 0.5);
    }

    #[test]
    fn test_unparseable_dates_dropped() {
        let tweets = vec![tweet("bullish", "garbage", 0, 0)];
        assert!(aggregate_by_day(&tweets).is_empty());
    }

    #[test]
    fn test_neutral_day_scores_half() {
        let tweets = vec![tweet("earnings report next week", "2026-02-02", 0, 0)];
        let samples = aggregate_by_day(&tweets);
        assert_eq!(samples[0].score, 0.5);
    }
}
