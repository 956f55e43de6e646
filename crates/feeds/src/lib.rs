//! Provider feeds and the refresh scheduler.
//!
//! This crate owns everything that touches the network: the provider client
//! traits and their reqwest implementations, the periodic refresh scheduler
//! that writes fetched payloads into the TTL cache, and the shutdown
//! controller that tears every job down on exit.

pub mod clients;
pub mod jobs;
pub mod scheduler;
pub mod shutdown;

pub use clients::{FmpClient, MarketFeed, PolymarketClient, PredictionFeed, SocialDataClient, SocialFeed};
pub use jobs::build_jobs;
pub use scheduler::{JobSpec, RefreshScheduler};
pub use shutdown::ShutdownController;
