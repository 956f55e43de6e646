use crate::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

#[instrument(skip(path))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    debug!("Config file content length: {} bytes", content.len());

    let substituted = substitution::substitute_env_vars(&content)?;

    let config: AppConfig = serde_yaml::from_str(&substituted)
        .with_context(|| "Failed to parse YAML configuration")?;

    info!("Configuration loaded successfully");
    Ok(config)
}

/// Build the default configuration. The FMP API key is left as a `${VAR}`
/// placeholder so a generated file substitutes it from the environment.
pub fn generate_default_config() -> AppConfig {
    AppConfig {
        providers: ProviderConfig {
            fmp_api_key: "${FMP_API_KEY}".to_string(),
            fmp_base_url: default_fmp_base_url(),
            polymarket_base_url: default_polymarket_base_url(),
            socialdata_api_key: String::new(),
            socialdata_base_url: default_socialdata_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        },
        cache_ttl: CacheTtlConfig::default(),
        refresh: RefreshConfig::default(),
        analytics: AnalyticsConfig::default(),
        keywords: KeywordConfig::default(),
        symbols: SymbolConfig::default(),
        log: LogConfig::default(),
    }
}

pub fn save_config<P: AsRef<Path>>(config: &AppConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;
    fs::write(path, yaml).with_context(|| format!("Failed to write config file: {:?}", path))?;
    info!("Configuration written to: {:?}", path);
    Ok(())
}
