use crate::*;
use thiserror::Error;
use url::Url;

/// Beyond this the tick-local backoff would outlast any sane refresh interval.
const MAX_RETRIES_CEILING: u32 = 10;

#[derive(Error, Debug, Clone)]
pub enum ValidationError {
    #[error("FMP API key is required (set FMP_API_KEY or providers.fmp_api_key)")]
    MissingFmpApiKey,

    #[error("FMP API key contains an unresolved placeholder: {0}")]
    UnresolvedApiKey(String),

    #[error("Invalid base URL for {provider}: {message}")]
    InvalidBaseUrl { provider: String, message: String },

    #[error("Request timeout must be positive")]
    InvalidRequestTimeout,

    #[error("Cache TTL for '{category}' must be at least 1 second")]
    InvalidCacheTtl { category: String },

    #[error("refresh.backoff_base_secs must be positive")]
    InvalidBackoffBase,

    #[error("refresh.max_retries must be at most {max}, got {got}")]
    ExcessiveMaxRetries { max: u32, got: u32 },

    #[error("analytics.risk_free_rate must be between 0 and 1, got {0}")]
    InvalidRiskFreeRate(f64),

    #[error("analytics.unusual_ratio_threshold must be positive, got {0}")]
    InvalidUnusualRatio(f64),

    #[error("Primary symbol must not be empty")]
    MissingPrimarySymbol,

    #[error("At least one hyperscaler symbol is required")]
    NoHyperscalers,

    #[error("Keyword lexicon must not be empty")]
    EmptyKeywordLexicon,

    #[error("Unknown log format: {0}. Must be one of: pretty, json, compact")]
    InvalidLogFormat(String),
}

/// Validate a loaded configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.providers.fmp_api_key.trim().is_empty() {
        errors.push(ValidationError::MissingFmpApiKey);
    } else if has_unresolved_env_vars(&config.providers.fmp_api_key) {
        errors.push(ValidationError::UnresolvedApiKey(
            config.providers.fmp_api_key.clone(),
        ));
    }

    for (provider, base) in [
        ("fmp", &config.providers.fmp_base_url),
        ("polymarket", &config.providers.polymarket_base_url),
        ("socialdata", &config.providers.socialdata_base_url),
    ] {
        match Url::parse(base) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(ValidationError::InvalidBaseUrl {
                provider: provider.to_string(),
                message: format!("unsupported scheme '{}'", url.scheme()),
            }),
            Err(e) => errors.push(ValidationError::InvalidBaseUrl {
                provider: provider.to_string(),
                message: e.to_string(),
            }),
        }
    }

    if config.providers.request_timeout_secs == 0 {
        errors.push(ValidationError::InvalidRequestTimeout);
    }

    for (category, ttl) in [
        ("price", config.cache_ttl.price),
        ("options", config.cache_ttl.options),
        ("sentiment", config.cache_ttl.sentiment),
        ("social", config.cache_ttl.social),
        ("prediction", config.cache_ttl.prediction),
        ("fundamentals", config.cache_ttl.fundamentals),
        ("transcripts", config.cache_ttl.transcripts),
    ] {
        if ttl == 0 {
            errors.push(ValidationError::InvalidCacheTtl {
                category: category.to_string(),
            });
        }
    }

    if config.refresh.backoff_base_secs == 0 {
        errors.push(ValidationError::InvalidBackoffBase);
    }

    if config.refresh.max_retries > MAX_RETRIES_CEILING {
        errors.push(ValidationError::ExcessiveMaxRetries {
            max: MAX_RETRIES_CEILING,
            got: config.refresh.max_retries,
        });
    }

    let rate = config.analytics.risk_free_rate;
    if !(0.0..=1.0).contains(&rate) {
        errors.push(ValidationError::InvalidRiskFreeRate(rate));
    }

    if config.analytics.unusual_ratio_threshold <= 0.0 {
        errors.push(ValidationError::InvalidUnusualRatio(
            config.analytics.unusual_ratio_threshold,
        ));
    }

    if config.symbols.primary.trim().is_empty() {
        errors.push(ValidationError::MissingPrimarySymbol);
    }

    if config.symbols.hyperscalers.is_empty() {
        errors.push(ValidationError::NoHyperscalers);
    }

    if config.keywords.lexicon().is_empty() {
        errors.push(ValidationError::EmptyKeywordLexicon);
    }

    if !matches!(config.log.format.as_str(), "pretty" | "json" | "compact") {
        errors.push(ValidationError::InvalidLogFormat(config.log.format.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
