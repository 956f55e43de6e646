//! Gamma-exposure (GEX) engine
//!
//! Aggregates Black-Scholes gamma across all option strikes to locate the
//! gamma-flip level and the strikes with the largest dealer hedging pressure.
//!
//! Per contract: calls contribute `gamma * OI * 100 * S^2` (positive), puts
//! the same magnitude negated, since dealers are modeled as net short puts.
//! Contracts that are expired or have zero open interest are excluded
//! entirely, not zero-weighted.

use crate::black_scholes;
use chrono::{DateTime, NaiveDate, Utc};
use common::{Error, OptionContract, OptionType};
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Each contract controls 100 shares
const CONTRACT_MULTIPLIER: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct GexParams {
    /// Annualized risk-free rate used for pricing and IV recovery
    pub risk_free_rate: f64,
}

impl Default for GexParams {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.045,
        }
    }
}

/// Net GEX components for a single strike, aggregated across expirations.
#[derive(Debug, Clone, Serialize)]
pub struct GexStrike {
    pub strike: f64,
    pub call_gex: f64,
    pub put_gex: f64,
    pub net_gex: f64,
}

/// Notable strike levels derived from the GEX profile.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GexKeyLevels {
    /// Strike with the highest positive net GEX
    pub max_positive_gex: Option<f64>,
    /// Strike with the most negative net GEX
    pub max_negative_gex: Option<f64>,
}

/// Full GEX engine output.
#[derive(Debug, Clone, Serialize)]
pub struct GexProfile {
    pub spot: f64,
    /// Lowest ascending strike where cumulative net GEX turns positive after
    /// being negative; `None` when no such crossing exists
    pub gamma_flip: Option<f64>,
    pub total_gex: f64,
    pub strikes: Vec<GexStrike>,
    pub key_levels: GexKeyLevels,
    /// Freshness of the cache inputs, not the computation time
    pub last_updated: DateTime<Utc>,
}

impl GexProfile {
    fn empty(spot: f64, as_of: DateTime<Utc>) -> Self {
        Self {
            spot,
            gamma_flip: None,
            total_gex: 0.0,
            strikes: Vec::new(),
            key_levels: GexKeyLevels::default(),
            last_updated: as_of,
        }
    }
}

/// Compute the gamma-exposure profile for an options chain.
///
/// `today` anchors time-to-expiry; `as_of` is the freshness timestamp of the
/// cached chain and spot, propagated unchanged into the result.
pub fn compute_gex(
    chain: &[OptionContract],
    spot: f64,
    today: NaiveDate,
    params: &GexParams,
    as_of: DateTime<Utc>,
) -> GexProfile {
    if chain.is_empty() || spot <= 0.0 {
        warn!(spot, contracts = chain.len(), "GEX input empty or invalid spot");
        return GexProfile::empty(spot, as_of);
    }

    let rate = params.risk_free_rate;
    let mut per_strike: BTreeMap<OrderedFloat<f64>, (f64, f64)> = BTreeMap::new();

    for contract in chain {
        if contract.open_interest == 0 {
            debug!(strike = contract.strike, "skipping zero-OI contract");
            continue;
        }

        let days = (contract.expiration - today).num_days();
        let time = days as f64 / 365.0;
        if time <= 0.0 {
            debug!(strike = contract.strike, days, "skipping expired contract");
            continue;
        }

        let sigma = match resolve_volatility(contract, spot, rate, time) {
            Ok(s) => s,
            Err(e) => {
                debug!(
                    strike = contract.strike,
                    option_type = %contract.option_type,
                    "skipping contract: {e}"
                );
                continue;
            }
        };

        let gamma = black_scholes::gamma(spot, contract.strike, rate, sigma, time);
        if gamma <= 0.0 {
            continue;
        }

        let magnitude =
            gamma * contract.open_interest as f64 * CONTRACT_MULTIPLIER * spot * spot;

        let entry = per_strike
            .entry(OrderedFloat(contract.strike))
            .or_insert((0.0, 0.0));
        match contract.option_type {
            OptionType::Call => entry.0 += magnitude,
            OptionType::Put => entry.1 -= magnitude,
        }
    }

    let strikes: Vec<GexStrike> = per_strike
        .into_iter()
        .map(|(strike, (call_gex, put_gex))| GexStrike {
            strike: strike.into_inner(),
            call_gex,
            put_gex,
            net_gex: call_gex + put_gex,
        })
        .collect();

    let total_gex: f64 = strikes.iter().map(|s| s.net_gex).sum();
    let gamma_flip = find_gamma_flip(&strikes);
    let key_levels = compute_key_levels(&strikes);

    info!(
        strikes = strikes.len(),
        total_gex,
        gamma_flip = ?gamma_flip,
        "GEX profile computed"
    );

    GexProfile {
        spot,
        gamma_flip,
        total_gex,
        strikes,
        key_levels,
        last_updated: as_of,
    }
}

/// Use the quoted IV when positive, otherwise recover it by bisection from
/// the contract's market price.
fn resolve_volatility(
    contract: &OptionContract,
    spot: f64,
    rate: f64,
    time: f64,
) -> Result<f64, Error> {
    if let Some(iv) = contract.implied_volatility.filter(|iv| *iv > 0.0) {
        return Ok(iv);
    }

    let market_price = contract.market_price().ok_or_else(|| {
        Error::computation(format!(
            "no usable market price for {} {}",
            contract.strike, contract.option_type
        ))
    })?;
    black_scholes::implied_volatility(
        market_price,
        spot,
        contract.strike,
        rate,
        time,
        contract.option_type,
    )
    .ok_or_else(|| {
        Error::computation(format!(
            "implied volatility did not converge for {} {} at price {market_price}",
            contract.strike, contract.option_type
        ))
    })
}

/// First strike (ascending) whose net GEX is positive after at least one
/// strike with negative net GEX. When the profile crosses zero more than
/// once, the lowest such crossing wins.
fn find_gamma_flip(strikes: &[GexStrike]) -> Option<f64> {
    let mut seen_negative = false;

    for row in strikes {
        if row.net_gex < 0.0 {
            seen_negative = true;
        } else if row.net_gex > 0.0 && seen_negative {
            return Some(row.strike);
        }
    }

    None
}

fn compute_key_levels(strikes: &[GexStrike]) -> GexKeyLevels {
    let max_positive_gex = strikes
        .iter()
        .filter(|s| s.net_gex > 0.0)
        .max_by(|a, b| a.net_gex.total_cmp(&b.net_gex))
        .map(|s| s.strike);

    let max_negative_gex = strikes
        .iter()
        .filter(|s| s.net_gex < 0.0)
        .min_by(|a, b| a.net_gex.total_cmp(&b.net_gex))
        .map(|s| s.strike);

    GexKeyLevels {
        max_positive_gex,
        max_negative_gex,
    }
}
