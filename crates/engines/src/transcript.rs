//! Transcript keyword-frequency engine
//!
//! Counts occurrences of a fixed, case-insensitive keyword lexicon in
//! earnings-call transcripts and tracks the quarter-over-quarter trend of
//! total mention counts across all tracked companies.

use chrono::{DateTime, Utc};
use common::Transcript;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Ordered keyword lexicon. Lexicon order doubles as the tie-break for the
/// top-keyword selection, so hardware terms outrank category terms at equal
/// counts.
#[derive(Debug, Clone)]
pub struct KeywordLexicon {
    keywords: Vec<String>,
}

impl KeywordLexicon {
    pub fn new(hardware: &[String], category: &[String]) -> Self {
        let keywords = hardware.iter().chain(category.iter()).cloned().collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TranscriptTrend {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

/// Per-transcript score.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptScore {
    pub symbol: String,
    /// Sortable `YYYY-QN` key, e.g. `2025-Q3`
    pub quarter_key: String,
    pub total_score: usize,
    /// Up to `top_n` keywords with count > 0, highest first
    pub top_keywords: Vec<KeywordCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuarterTotal {
    pub quarter_key: String,
    pub total_score: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptReport {
    pub scores: Vec<TranscriptScore>,
    /// Cross-company totals, ascending by quarter key
    pub quarter_totals: Vec<QuarterTotal>,
    pub trend: TranscriptTrend,
    pub last_updated: DateTime<Utc>,
}

/// Count non-overlapping occurrences of `needle` in `haystack`, both already
/// lowercased.
fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    let mut count = 0;
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(needle) {
        count += 1;
        from += pos + needle.len();
    }
    count
}

fn score_transcript(transcript: &Transcript, lexicon: &KeywordLexicon, top_n: usize) -> TranscriptScore {
    let content = transcript.content.to_lowercase();

    let mut counts: Vec<KeywordCount> = lexicon
        .keywords()
        .iter()
        .map(|kw| KeywordCount {
            keyword: kw.clone(),
            count: count_occurrences(&content, &kw.to_lowercase()),
        })
        .collect();

    let total_score = counts.iter().map(|c| c.count).sum();

    // Stable sort keeps lexicon order across equal counts.
    counts.retain(|c| c.count > 0);
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(top_n);

    TranscriptScore {
        symbol: transcript.symbol.clone(),
        quarter_key: format!("{}-Q{}", transcript.year, transcript.quarter),
        total_score,
        top_keywords: counts,
    }
}

fn quarter_trend(totals: &[QuarterTotal]) -> TranscriptTrend {
    match totals {
        [.., prev, latest] => {
            if latest.total_score > prev.total_score {
                TranscriptTrend::Increasing
            } else if latest.total_score < prev.total_score {
                TranscriptTrend::Decreasing
            } else {
                TranscriptTrend::Stable
            }
        }
        _ => TranscriptTrend::Stable,
    }
}

/// Score every transcript and derive the cross-company quarterly trend.
pub fn analyze(
    transcripts: &[Transcript],
    lexicon: &KeywordLexicon,
    top_n: usize,
    as_of: DateTime<Utc>,
) -> TranscriptReport {
    let scores: Vec<TranscriptScore> = transcripts
        .iter()
        .map(|t| score_transcript(t, lexicon, top_n))
        .collect();

    let mut totals_by_quarter: BTreeMap<String, usize> = BTreeMap::new();
    for score in &scores {
        *totals_by_quarter.entry(score.quarter_key.clone()).or_insert(0) += score.total_score;
    }

    let quarter_totals: Vec<QuarterTotal> = totals_by_quarter
        .into_iter()
        .map(|(quarter_key, total_score)| QuarterTotal {
            quarter_key,
            total_score,
        })
        .collect();

    let trend = quarter_trend(&quarter_totals);
    info!(
        transcripts = scores.len(),
        quarters = quarter_totals.len(),
        trend = ?trend,
        "transcript keyword analysis complete"
    );

    TranscriptReport {
        scores,
        quarter_totals,
        trend,
        last_updated: as_of,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 2, 12, 0, 0).unwrap()
    }

    fn lexicon() -> KeywordLexicon {
        KeywordLexicon::new(
            &["H100".into(), "H200".into(), "Blackwell".into()],
            &["data center".into(), "AI".into()],
        )
    }

    fn transcript(symbol: &str, year: i32, quarter: u8, content: &str) -> Transcript {
        Transcript {
            symbol: symbol.to_string(),
            quarter,
            year,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_case_insensitive_counting() {
        let t = transcript("MSFT", 2025, 3, "h100 deployments and more H100 and blackwell");
        let report = analyze(&[t], &lexicon(), 5, as_of());
        let score = &report.scores[0];
        let h100 = score.top_keywords.iter().find(|k| k.keyword == "H100").unwrap();
        assert_eq!(h100.count, 2);
        let bw = score.top_keywords.iter().find(|k| k.keyword == "Blackwell").unwrap();
        assert_eq!(bw.count, 1);
    }

    #[test]
    fn test_total_is_sum_of_counts() {
        let t = transcript("MSFT", 2025, 3, "H100 H200 AI AI data center");
        let report = analyze(&[t], &lexicon(), 5, as_of());
        assert_eq!(report.scores[0].total_score, 5);
    }

    #[test]
    fn test_zero_count_keywords_dropped() {
        let t = transcript("MSFT", 2025, 3, "H100 only");
        let report = analyze(&[t], &lexicon(), 5, as_of());
        assert_eq!(report.scores[0].top_keywords.len(), 1);
        assert_eq!(report.scores[0].top_keywords[0].keyword, "H100");
    }

    #[test]
    fn test_top_n_truncation_and_order() {
        let t = transcript(
            "MSFT",
            2025,
            3,
            "AI AI AI H100 H100 H200 Blackwell data center",
        );
        let report = analyze(&[t], &lexicon(), 2, as_of());
        let top = &report.scores[0].top_keywords;
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].keyword, "AI");
        assert_eq!(top[1].keyword, "H100");
    }

    #[test]
    fn test_ties_resolve_in_lexicon_order() {
        // Every keyword appears exactly once; hardware terms come first.
        let t = transcript("MSFT", 2025, 3, "AI data center Blackwell H200 H100");
        let report = analyze(&[t], &lexicon(), 3, as_of());
        let names: Vec<&str> = report.scores[0]
            .top_keywords
            .iter()
            .map(|k| k.keyword.as_str())
            .collect();
        assert_eq!(names, vec!["H100", "H200", "Blackwell"]);
    }

    #[test]
    fn test_quarter_totals_aggregate_across_companies() {
        let transcripts = vec![
            transcript("MSFT", 2025, 2, "H100 H100"),
            transcript("AMZN", 2025, 2, "H100"),
            transcript("MSFT", 2025, 3, "H100"),
        ];
        let report = analyze(&transcripts, &lexicon(), 5, as_of());
        assert_eq!(report.quarter_totals.len(), 2);
        assert_eq!(report.quarter_totals[0].quarter_key, "2025-Q2");
        assert_eq!(report.quarter_totals[0].total_score, 3);
        assert_eq!(report.quarter_totals[1].total_score, 1);
        assert_eq!(report.trend, TranscriptTrend::Decreasing);
    }

    #[test]
    fn test_increasing_trend() {
        let transcripts = vec![
            transcript("MSFT", 2025, 2, "H100"),
            transcript("MSFT", 2025, 3, "H100 H100"),
        ];
        let report = analyze(&transcripts, &lexicon(), 5, as_of());
        assert_eq!(report.trend, TranscriptTrend::Increasing);
    }

    #[test]
    fn test_single_quarter_is_stable() {
        let report = analyze(
            &[transcript("MSFT", 2025, 3, "H100")],
            &lexicon(),
            5,
            as_of(),
        );
        assert_eq!(report.trend, TranscriptTrend::Stable);
    }

    #[test]
    fn test_empty_input_is_empty_report() {
        let report = analyze(&[], &lexicon(), 5, as_of());
        assert!(report.scores.is_empty());
        assert!(report.quarter_totals.is_empty());
        assert_eq!(report.trend, TranscriptTrend::Stable);
    }

    #[test]
    fn test_quarter_keys_sort_across_year_boundary() {
        let transcripts = vec![
            transcript("MSFT", 2024, 4, "H100 H100 H100"),
            transcript("MSFT", 2025, 1, "H100"),
        ];
        let report = analyze(&transcripts, &lexicon(), 5, as_of());
        assert_eq!(report.quarter_totals[0].quarter_key, "2024-Q4");
        assert_eq!(report.quarter_totals[1].quarter_key, "2025-Q1");
        assert_eq!(report.trend, TranscriptTrend::Decreasing);
    }
}
