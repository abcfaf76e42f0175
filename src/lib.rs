//! Hourly TON market sampler.
//!
//! One invocation fetches the TON/USD spot price (CoinMarketCap) and the
//! STON.fi cumulative DEX volume (DeFiLlama) concurrently, appends a
//! timestamped row to a local CSV log, and, when running under Cloud Run,
//! mirrors the latest row to a GCS object.

pub mod config;
pub mod fetch;
pub mod mirror;
pub mod record;
pub mod store;
pub mod utils;

pub use config::Config;
pub use fetch::FetchOutcome;
pub use record::SampleRecord;
