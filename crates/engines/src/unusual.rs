//! Unusual options activity scanner
//!
//! Flags contracts where volume runs well ahead of open interest: fresh
//! positioning rather than rolled positions. The volume floor suppresses
//! noise from thinly traded low-OI contracts whose ratios are extreme but
//! meaningless.

use chrono::{DateTime, NaiveDate, Utc};
use common::{OptionContract, OptionType};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct UnusualParams {
    /// Minimum volume / open-interest ratio to flag
    pub ratio_threshold: f64,
    /// Minimum traded volume to flag
    pub min_volume: u64,
    /// Truncate the sorted result to this many contracts
    pub max_results: usize,
}

impl Default for UnusualParams {
    fn default() -> Self {
        Self {
            ratio_threshold: 2.0,
            min_volume: 1000,
            max_results: 20,
        }
    }
}

/// A single flagged contract.
#[derive(Debug, Clone, Serialize)]
pub struct UnusualContract {
    pub strike: f64,
    pub expiration: NaiveDate,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub volume: u64,
    pub open_interest: u64,
    pub vol_oi_ratio: f64,
    pub implied_volatility: Option<f64>,
    pub last_price: Option<f64>,
}

/// Scanner output.
#[derive(Debug, Clone, Serialize)]
pub struct UnusualActivity {
    /// Flagged contracts sorted by ratio descending, truncated to the top N
    pub contracts: Vec<UnusualContract>,
    /// Count of all flagged contracts before truncation
    pub total_flagged: usize,
    /// Puts / calls among ALL flagged contracts; 0.0 with no flagged calls
    pub put_call_ratio: f64,
    pub last_updated: DateTime<Utc>,
}

/// Scan an options chain for abnormally high volume/OI ratios.
pub fn scan(
    chain: &[OptionContract],
    params: &UnusualParams,
    as_of: DateTime<Utc>,
) -> UnusualActivity {
    let mut flagged: Vec<UnusualContract> = Vec::new();

    for contract in chain {
        // Zero OI would divide by zero; zero volume can never flag.
        if contract.open_interest == 0 || contract.volume == 0 {
            debug!(
                strike = contract.strike,
                oi = contract.open_interest,
                volume = contract.volume,
                "skipping contract without usable volume/OI"
            );
            continue;
        }

        let ratio = contract.volume as f64 / contract.open_interest as f64;

        if ratio > params.ratio_threshold && contract.volume > params.min_volume {
            flagged.push(UnusualContract {
                strike: contract.strike,
                expiration: contract.expiration,
                option_type: contract.option_type,
                volume: contract.volume,
                open_interest: contract.open_interest,
                vol_oi_ratio: ratio,
                implied_volatility: contract.implied_volatility,
                last_price: contract.last_price,
            });
        }
    }

    let total_flagged = flagged.len();

    // Put/call ratio over the full flagged set, not the truncated one.
    let puts = flagged
        .iter()
        .filter(|c| c.option_type == OptionType::Put)
        .count();
    let calls = total_flagged - puts;
    let put_call_ratio = if calls > 0 {
        puts as f64 / calls as f64
    } else {
        0.0
    };

    flagged.sort_by(|a, b| b.vol_oi_ratio.total_cmp(&a.vol_oi_ratio));
    flagged.truncate(params.max_results);

    info!(
        total_flagged,
        returned = flagged.len(),
        put_call_ratio,
        "unusual activity scan complete"
    );

    UnusualActivity {
        contracts: flagged,
        total_flagged,
        put_call_ratio,
        last_updated: as_of,
    }
}
