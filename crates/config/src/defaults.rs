pub fn default_fmp_base_url() -> String {
    "https://financialmodelingprep.com/stable".to_string()
}

pub fn default_polymarket_base_url() -> String {
    "https://gamma-api.polymarket.com".to_string()
}

pub fn default_socialdata_base_url() -> String {
    "https://api.socialdata.tools".to_string()
}

pub fn default_request_timeout_secs() -> u64 {
    30
}

pub fn default_ttl_price() -> u64 {
    5
}

pub fn default_ttl_options() -> u64 {
    60
}

pub fn default_ttl_sentiment() -> u64 {
    900
}

pub fn default_ttl_social() -> u64 {
    60
}

pub fn default_ttl_prediction() -> u64 {
    30
}

pub fn default_ttl_fundamentals() -> u64 {
    86400
}

pub fn default_ttl_transcripts() -> u64 {
    86400
}

pub fn default_max_retries() -> u32 {
    3
}

pub fn default_backoff_base_secs() -> u64 {
    1
}

pub fn default_risk_free_rate() -> f64 {
    0.045
}

pub fn default_unusual_ratio_threshold() -> f64 {
    2.0
}

pub fn default_unusual_min_volume() -> u64 {
    1000
}

pub fn default_unusual_max_results() -> usize {
    20
}

pub fn default_sentiment_days() -> usize {
    7
}

pub fn default_volume_spike_multiplier() -> f64 {
    2.0
}

pub fn default_top_keywords() -> usize {
    5
}

pub fn default_primary_symbol() -> String {
    "NVDA".to_string()
}

pub fn default_hyperscalers() -> Vec<String> {
    ["MSFT", "AMZN", "GOOGL", "META"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn default_hardware_keywords() -> Vec<String> {
    [
        "H100", "H200", "B100", "B200", "Blackwell", "Hopper", "Grace", "DGX", "HGX", "NVLink",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn default_category_keywords() -> Vec<String> {
    [
        "GPU",
        "accelerator",
        "data center",
        "AI infrastructure",
        "AI training",
        "AI inference",
        "compute spend",
        "compute capacity",
        "AI workload",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}
