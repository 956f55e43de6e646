//! Computation engines for MarketPulse
//!
//! Six pure, stateless transforms over cached provider payloads. Engines
//! never perform I/O: the caller reads the cache, passes the payload in
//! together with its freshness timestamp, and gets a structured result back.
//!
//! # Core Components
//!
//! - [`black_scholes`] - Pricing, gamma, and bisection implied-volatility solver
//! - [`gex`] - Gamma-exposure curve and gamma-flip detection
//! - [`unusual`] - Unusual options activity scanner
//! - [`sentiment`] - Social sentiment composite scoring
//! - [`capex`] - Hyperscaler capital-expenditure ratios and trend
//! - [`transcript`] - Earnings-transcript keyword frequency analysis
//! - [`prediction`] - Prediction-market price-level heatmap
//!
//! # Key Invariants
//!
//! - Every result carries `last_updated` equal to the freshness of its cache
//!   inputs, never the wall clock of the computation.
//! - Empty or partial input produces a neutral/empty result, never an error.
//! - Engines may be invoked concurrently and repeatedly without coordination.

pub mod black_scholes;
pub mod capex;
pub mod gex;
pub mod prediction;
pub mod sentiment;
pub mod transcript;
pub mod unusual;

pub use capex::{CapexParams, CapexReport, CapexTrend};
pub use gex::{GexParams, GexProfile, GexStrike};
pub use prediction::{PredictionHeatmap, PredictionKeyLevels};
pub use sentiment::{SentimentLabel, SentimentParams, SentimentSignal};
pub use transcript::{KeywordLexicon, TranscriptReport, TranscriptTrend};
pub use unusual::{UnusualActivity, UnusualParams};
