//! Common types and utilities for MarketPulse
//!
//! This crate provides the shared error taxonomy and the domain types that
//! flow between the data feeds, the TTL cache, and the computation engines.
//!
//! # Modules
//!
//! - [`error`] - Error taxonomy for feed and computation failures
//! - [`types`] - Shared domain types (OptionContract, SentimentSample, etc.)

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
