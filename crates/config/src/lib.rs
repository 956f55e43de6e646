use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

/// Top-level application configuration, loaded from YAML with `${VAR}`
/// environment-variable substitution.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub providers: ProviderConfig,
    #[serde(default)]
    pub cache_ttl: CacheTtlConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub keywords: KeywordConfig,
    #[serde(default)]
    pub symbols: SymbolConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// External provider endpoints and credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Financial Modeling Prep API key (required)
    pub fmp_api_key: String,
    #[serde(default = "default_fmp_base_url")]
    pub fmp_base_url: String,
    #[serde(default = "default_polymarket_base_url")]
    pub polymarket_base_url: String,
    /// SocialData API key; empty disables the social feed job
    #[serde(default)]
    pub socialdata_api_key: String,
    #[serde(default = "default_socialdata_base_url")]
    pub socialdata_base_url: String,
    /// Per-request timeout; an expiry counts as a fetch failure
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Per-category cache TTLs in seconds. Each refresh job runs on an interval
/// equal to its category's TTL to keep the cache continuously warm.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheTtlConfig {
    #[serde(default = "default_ttl_price")]
    pub price: u64,
    #[serde(default = "default_ttl_options")]
    pub options: u64,
    #[serde(default = "default_ttl_sentiment")]
    pub sentiment: u64,
    #[serde(default = "default_ttl_social")]
    pub social: u64,
    #[serde(default = "default_ttl_prediction")]
    pub prediction: u64,
    #[serde(default = "default_ttl_fundamentals")]
    pub fundamentals: u64,
    #[serde(default = "default_ttl_transcripts")]
    pub transcripts: u64,
}

impl Default for CacheTtlConfig {
    fn default() -> Self {
        Self {
            price: default_ttl_price(),
            options: default_ttl_options(),
            sentiment: default_ttl_sentiment(),
            social: default_ttl_social(),
            prediction: default_ttl_prediction(),
            fundamentals: default_ttl_fundamentals(),
            transcripts: default_ttl_transcripts(),
        }
    }
}

/// Retry/backoff policy applied by the scheduler within a single tick.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshConfig {
    /// Retries after the initial attempt (3 -> delays of 1s, 2s, 4s)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_base_secs")]
    pub backoff_base_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_base_secs: default_backoff_base_secs(),
        }
    }
}

impl RefreshConfig {
    /// Backoff delay before retry number `attempt` (zero-based): base * 2^attempt,
    /// saturating instead of overflowing for absurd attempt counts.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_secs(self.backoff_base_secs.saturating_mul(factor))
    }
}

/// Tunables consumed by the computation engines.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyticsConfig {
    /// Annualized risk-free rate for options pricing (0-1)
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
    #[serde(default = "default_unusual_ratio_threshold")]
    pub unusual_ratio_threshold: f64,
    #[serde(default = "default_unusual_min_volume")]
    pub unusual_min_volume: u64,
    #[serde(default = "default_unusual_max_results")]
    pub unusual_max_results: usize,
    #[serde(default = "default_sentiment_days")]
    pub sentiment_days: usize,
    #[serde(default = "default_volume_spike_multiplier")]
    pub volume_spike_multiplier: f64,
    #[serde(default = "default_top_keywords")]
    pub top_keywords: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: default_risk_free_rate(),
            unusual_ratio_threshold: default_unusual_ratio_threshold(),
            unusual_min_volume: default_unusual_min_volume(),
            unusual_max_results: default_unusual_max_results(),
            sentiment_days: default_sentiment_days(),
            volume_spike_multiplier: default_volume_spike_multiplier(),
            top_keywords: default_top_keywords(),
        }
    }
}

/// Fixed keyword lexicon for the transcript engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeywordConfig {
    #[serde(default = "default_hardware_keywords")]
    pub hardware: Vec<String>,
    #[serde(default = "default_category_keywords")]
    pub category: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            hardware: default_hardware_keywords(),
            category: default_category_keywords(),
        }
    }
}

impl KeywordConfig {
    /// Combined lexicon, hardware terms first. Order matters: it is the
    /// tie-break for equal counts in the top-keyword selection.
    pub fn lexicon(&self) -> Vec<String> {
        self.hardware.iter().chain(self.category.iter()).cloned().collect()
    }
}

/// Tracked symbols: the primary underlying plus its hyperscaler customers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SymbolConfig {
    #[serde(default = "default_primary_symbol")]
    pub primary: String,
    #[serde(default = "default_hyperscalers")]
    pub hyperscalers: Vec<String>,
}

impl Default for SymbolConfig {
    fn default() -> Self {
        Self {
            primary: default_primary_symbol(),
            hyperscalers: default_hyperscalers(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
