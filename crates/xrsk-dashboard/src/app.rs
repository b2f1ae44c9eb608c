//! Application root: owns the collector and the shared cache.
//!
//! Every load path goes through [`MemoStore::get_or_compute`], so any number
//! of concurrent viewers cost one upstream call per key per TTL window.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use xrsk_bridges::{BridgeRecord, Collector, CollectorRegistry, MemoKey, MemoStore, RawRecord};

use crate::config::DashboardConfig;
use crate::error::DashboardResult;

/// Shared dashboard state, cheap to clone.
#[derive(Clone)]
pub struct Dashboard {
    source: String,
    collector: Arc<dyn Collector>,
    cache: Arc<MemoStore>,
    ttl: Duration,
}

impl Dashboard {
    /// Build the dashboard, resolving `config.source` against `registry`.
    pub fn new(config: &DashboardConfig, registry: &CollectorRegistry) -> DashboardResult<Self> {
        let collector = registry.get(&config.source)?;
        tracing::info!(source = %config.source, ttl_secs = config.ttl.as_secs(), "dashboard ready");
        Ok(Self::with_collector(config.source.clone(), collector, config.ttl))
    }

    pub fn with_collector(source: String, collector: Arc<dyn Collector>, ttl: Duration) -> Self {
        Self {
            source,
            collector,
            cache: Arc::new(MemoStore::new()),
            ttl,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn cache(&self) -> &MemoStore {
        &self.cache
    }

    /// The normalised catalogue, memoised per source.
    pub async fn bridges(&self) -> Arc<Vec<BridgeRecord>> {
        let collector = Arc::clone(&self.collector);
        self.cache
            .get_or_compute(MemoKey::new("bridges", &self.source), self.ttl, || async move {
                collector.list_formatted().await
            })
            .await
    }

    /// Upstream details for one bridge, memoised per id.
    pub async fn bridge(&self, id: &str) -> Arc<Option<RawRecord>> {
        let collector = Arc::clone(&self.collector);
        let id = id.to_string();
        self.cache
            .get_or_compute(
                MemoKey::new("bridge", &(&self.source, &id)),
                self.ttl,
                || async move { collector.bridge(&id).await },
            )
            .await
    }

    /// Upstream volume history for one bridge, memoised per id.
    pub async fn bridge_volume(&self, id: &str) -> Arc<Option<Value>> {
        let collector = Arc::clone(&self.collector);
        let id = id.to_string();
        self.cache
            .get_or_compute(
                MemoKey::new("bridge_volume", &(&self.source, &id)),
                self.ttl,
                || async move { collector.bridge_volume(&id).await },
            )
            .await
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("source", &self.source)
            .field("ttl", &self.ttl)
            .field("cached", &self.cache.len())
            .finish()
    }
}
