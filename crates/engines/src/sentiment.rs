//! Social sentiment engine
//!
//! Turns a short daily series of sentiment samples into a composite score,
//! a momentum (rate-of-change) signal, and a mention-volume spike flag.
//!
//! Composite scoring:
//!   base    = (today_avg - 0.5) * 200        maps [0,1] onto [-100, +100]
//!   roc_adj = clamp(roc * 20, -20, +20)
//!   spike   = +10 when the volume spike flag is set
//!   score   = clamp(base + roc_adj + spike, -100, +100)

use chrono::{DateTime, NaiveDate, Utc};
use common::SentimentSample;
use serde::Serialize;
use tracing::{debug, info};

const SCORE_SCALE: f64 = 200.0;
const SCORE_MIDPOINT: f64 = 0.5;
const ROC_MULTIPLIER: f64 = 20.0;
const ROC_MAX_ADJ: f64 = 20.0;
const SPIKE_BONUS: f64 = 10.0;
const SCORE_MIN: f64 = -100.0;
const SCORE_MAX: f64 = 100.0;

const BULLISH_THRESHOLD: f64 = 20.0;
const BEARISH_THRESHOLD: f64 = -20.0;

#[derive(Debug, Clone)]
pub struct SentimentParams {
    /// Trailing window length in days
    pub window_days: usize,
    /// Today's mentions must exceed this multiple of the window average
    pub spike_multiplier: f64,
}

impl Default for SentimentParams {
    fn default() -> Self {
        Self {
            window_days: 7,
            spike_multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SentimentLabel {
    Bullish,
    Neutral,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RocDirection {
    Accelerating,
    Stable,
    Decelerating,
}

/// Per-day score for the history series.
#[derive(Debug, Clone, Serialize)]
pub struct SentimentDay {
    pub date: NaiveDate,
    pub score: f64,
    pub mentions: u64,
}

/// Engine output.
#[derive(Debug, Clone, Serialize)]
pub struct SentimentSignal {
    /// Composite score in [-100, +100]
    pub current_score: f64,
    pub label: SentimentLabel,
    /// (today_avg - yesterday_avg) / |yesterday_avg|; 0.0 when yesterday is
    /// zero or missing
    pub rate_of_change: f64,
    pub roc_direction: RocDirection,
    pub mentions_today: u64,
    pub mentions_window_avg: f64,
    pub volume_spike: bool,
    /// Days before today, oldest first
    pub history: Vec<SentimentDay>,
    pub last_updated: DateTime<Utc>,
}

impl SentimentSignal {
    fn neutral(as_of: DateTime<Utc>) -> Self {
        Self {
            current_score: 0.0,
            label: SentimentLabel::Neutral,
            rate_of_change: 0.0,
            roc_direction: RocDirection::Stable,
            mentions_today: 0,
            mentions_window_avg: 0.0,
            volume_spike: false,
            history: Vec::new(),
            last_updated: as_of,
        }
    }
}

fn clamp(value: f64, low: f64, high: f64) -> f64 {
    value.max(low).min(high)
}

fn composite_score(avg: f64, roc: f64, spike: bool) -> f64 {
    let base = (avg - SCORE_MIDPOINT) * SCORE_SCALE;
    let roc_adj = clamp(roc * ROC_MULTIPLIER, -ROC_MAX_ADJ, ROC_MAX_ADJ);
    let spike_adj = if spike { SPIKE_BONUS } else { 0.0 };
    clamp(base + roc_adj + spike_adj, SCORE_MIN, SCORE_MAX)
}

fn label(score: f64) -> SentimentLabel {
    if score > BULLISH_THRESHOLD {
        SentimentLabel::Bullish
    } else if score < BEARISH_THRESHOLD {
        SentimentLabel::Bearish
    } else {
        SentimentLabel::Neutral
    }
}

fn roc_direction(roc: f64) -> RocDirection {
    if roc > 0.0 {
        RocDirection::Accelerating
    } else if roc < 0.0 {
        RocDirection::Decelerating
    } else {
        RocDirection::Stable
    }
}

/// Process a daily sentiment series into a composite signal.
///
/// Samples may arrive in any order; the engine sorts by date descending and
/// keeps the most recent `window_days`. Empty input yields neutral defaults.
pub fn process(
    samples: &[SentimentSample],
    params: &SentimentParams,
    as_of: DateTime<Utc>,
) -> SentimentSignal {
    if samples.is_empty() {
        info!("sentiment input empty, returning neutral signal");
        return SentimentSignal::neutral(as_of);
    }

    let mut sorted: Vec<&SentimentSample> = samples.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(params.window_days.max(1));

    let today = sorted[0];

    let roc = match sorted.get(1) {
        Some(yesterday) if yesterday.score != 0.0 => {
            (today.score - yesterday.score) / yesterday.score.abs()
        }
        Some(_) => {
            // Guarded division: zero yesterday produces the neutral sentinel.
            debug!("yesterday average is zero, rate-of-change pinned to 0.0");
            0.0
        }
        None => 0.0,
    };

    let window_total: u64 = sorted.iter().map(|s| s.mentions).sum();
    let window_avg = window_total as f64 / sorted.len() as f64;

    let volume_spike =
        window_avg > 0.0 && today.mentions as f64 > params.spike_multiplier * window_avg;

    let score = composite_score(today.score, roc, volume_spike);

    let history: Vec<SentimentDay> = sorted[1..]
        .iter()
        .rev()
        .map(|s| SentimentDay {
            date: s.date,
            // Older days carry no ROC/volume context of their own.
            score: composite_score(s.score, 0.0, false),
            mentions: s.mentions,
        })
        .collect();

    info!(
        score,
        label = ?label(score),
        roc,
        volume_spike,
        "sentiment signal computed"
    );

    SentimentSignal {
        current_score: score,
        label: label(score),
        rate_of_change: roc,
        roc_direction: roc_direction(roc),
        mentions_today: today.mentions,
        mentions_window_avg: window_avg,
        volume_spike,
        history,
        last_updated: as_of,
    }
}
