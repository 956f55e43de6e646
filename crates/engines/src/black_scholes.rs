//! Black-Scholes pricing, gamma, and implied-volatility recovery
//!
//! The IV solver uses bisection over a bounded volatility domain rather than
//! Newton's method: deep out-of-the-money contracts have near-zero vega and
//! Newton steps diverge there, while bisection converges on any bracketed
//! root.

use common::OptionType;
use std::f64::consts::PI;

/// Bisection search bounds for implied volatility
pub const IV_BISECT_LOW: f64 = 0.01;
pub const IV_BISECT_HIGH: f64 = 5.0;
pub const IV_BISECT_TOLERANCE: f64 = 1e-4;
pub const IV_BISECT_MAX_ITER: u32 = 100;

/// Skip gamma when sigma*sqrt(T) falls below this
pub const MIN_SIGMA_SQRT_T: f64 = 1e-8;

pub fn norm_pdf(x: f64) -> f64 {
    (1.0 / (2.0 * PI).sqrt()) * (-0.5 * x * x).exp()
}

/// Abramowitz-Stegun polynomial approximation, accurate to ~7.5e-8.
pub fn norm_cdf(x: f64) -> f64 {
    let k = 1.0 / (1.0 + 0.2316419 * x.abs());
    let poly = k
        * (0.319381530
            + k * (-0.356563782 + k * (1.781477937 + k * (-1.821255978 + k * 1.330274429))));

    let approx = 1.0 - norm_pdf(x) * poly;

    if x >= 0.0 {
        approx
    } else {
        1.0 - approx
    }
}

fn d1(spot: f64, strike: f64, rate: f64, sigma: f64, time: f64) -> f64 {
    ((spot / strike).ln() + (rate + 0.5 * sigma * sigma) * time) / (sigma * time.sqrt())
}

/// Black-Scholes theoretical price for a European option.
///
/// Assumes `time > 0` and `sigma > 0`; callers filter expired contracts
/// before pricing.
pub fn price(
    spot: f64,
    strike: f64,
    rate: f64,
    sigma: f64,
    time: f64,
    option_type: OptionType,
) -> f64 {
    let d1 = d1(spot, strike, rate, sigma, time);
    let d2 = d1 - sigma * time.sqrt();
    let discount = (-rate * time).exp();

    match option_type {
        OptionType::Call => spot * norm_cdf(d1) - strike * discount * norm_cdf(d2),
        OptionType::Put => strike * discount * norm_cdf(-d2) - spot * norm_cdf(-d1),
    }
}

/// Black-Scholes gamma, identical for calls and puts.
///
/// Gamma = N'(d1) / (S * sigma * sqrt(T)). Returns 0.0 when sigma*sqrt(T)
/// is too small to divide by.
pub fn gamma(spot: f64, strike: f64, rate: f64, sigma: f64, time: f64) -> f64 {
    let sigma_sqrt_t = sigma * time.sqrt();
    if sigma_sqrt_t < MIN_SIGMA_SQRT_T {
        return 0.0;
    }

    let d1 = d1(spot, strike, rate, sigma, time);
    norm_pdf(d1) / (spot * sigma_sqrt_t)
}

/// Recover implied volatility from a market price via bisection.
///
/// Searches [`IV_BISECT_LOW`, `IV_BISECT_HIGH`] for a sigma whose
/// Black-Scholes price matches `market_price` within [`IV_BISECT_TOLERANCE`].
/// Returns `None` when the price is outside the achievable range or the
/// search fails to converge within [`IV_BISECT_MAX_ITER`] iterations.
pub fn implied_volatility(
    market_price: f64,
    spot: f64,
    strike: f64,
    rate: f64,
    time: f64,
    option_type: OptionType,
) -> Option<f64> {
    if market_price <= 0.0 || time <= 0.0 {
        return None;
    }

    // Market price below intrinsic has no valid IV.
    let discount = (-rate * time).exp();
    let intrinsic = match option_type {
        OptionType::Call => (spot - strike * discount).max(0.0),
        OptionType::Put => (strike * discount - spot).max(0.0),
    };
    if market_price < intrinsic - IV_BISECT_TOLERANCE {
        return None;
    }

    let mut low = IV_BISECT_LOW;
    let mut high = IV_BISECT_HIGH;

    let price_low = price(spot, strike, rate, low, time, option_type);
    let price_high = price(spot, strike, rate, high, time, option_type);

    if market_price < price_low - IV_BISECT_TOLERANCE
        || market_price > price_high + IV_BISECT_TOLERANCE
    {
        return None;
    }

    for _ in 0..IV_BISECT_MAX_ITER {
        let mid = (low + high) / 2.0;
        let error = price(spot, strike, rate, mid, time, option_type) - market_price;

        if error.abs() < IV_BISECT_TOLERANCE {
            return Some(mid);
        }

        // BS price is monotonically increasing in sigma.
        if error < 0.0 {
            low = mid;
        } else {
            high = mid;
        }
    }

    None
}
