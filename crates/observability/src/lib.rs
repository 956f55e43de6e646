//! Observability infrastructure for MarketPulse
//!
//! Structured logging via tracing. The refresh scheduler and the engines log
//! through `tracing`; this crate owns subscriber setup.
//!
//! # Quick Start
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! init_logging("pulse", LogFormat::Pretty)?;
//! ```

pub mod logging;

pub use logging::{init_logging, init_logging_with_level, LogFormat};
