//! XRSK Bridges: cached access to cross-chain bridge metrics and the
//! indicators derived from them.
//!
//! Data flows leaves-first: [`client::UpstreamClient`] fetches the raw
//! catalogue, [`normalize`] projects it into [`BridgeRecord`]s, a
//! [`collector::Collector`] combines the two behind a failure-free facade,
//! [`memo::MemoStore`] shares results across viewers for a TTL window, and
//! [`derive`] / [`summary`] compute indicators over the resulting table.

pub mod client;
pub mod collector;
pub mod config;
pub mod derive;
pub mod export;
pub mod memo;
pub mod normalize;
pub mod registry;
pub mod summary;
pub mod types;

pub use async_trait::async_trait;
pub use client::UpstreamClient;
pub use collector::{Collector, DefiLlamaCollector};
pub use config::UpstreamConfig;
pub use derive::{Annotated, Column};
pub use export::{read_csv, to_csv_string, write_csv};
pub use memo::{memoize, MemoKey, MemoStore, Memoized};
pub use normalize::{normalize, normalize_batch, NormalizeError};
pub use registry::{CollectorCtor, CollectorRegistry};
pub use summary::{chain_distribution, BridgeFilter, Summary};
pub use types::*;
