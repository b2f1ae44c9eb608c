//! Collector facade: the capability set every upstream provider exposes.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use crate::client::UpstreamClient;
use crate::config::UpstreamConfig;
use crate::normalize::normalize_batch;
use crate::types::{BridgeRecord, BridgeResult, RawRecord};

/// A source of bridge catalogue data.
///
/// Implementations recover every transport and protocol failure: an
/// unreachable upstream yields an empty catalogue, never an error.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Registry name of this collector.
    fn name(&self) -> &str;

    /// The raw catalogue, in upstream order. Empty on failure.
    async fn list_all(&self) -> Vec<RawRecord>;

    /// The normalised catalogue, in upstream order, skipping malformed records.
    async fn list_formatted(&self) -> Vec<BridgeRecord> {
        let raws = self.list_all().await;
        normalize_batch(&raws, Utc::now())
    }

    /// Provider-specific details for one bridge.
    async fn bridge(&self, _id: &str) -> Option<RawRecord> {
        None
    }

    /// Provider-specific volume history for one bridge.
    async fn bridge_volume(&self, _id: &str) -> Option<Value> {
        None
    }
}

/// Collector backed by the DefiLlama bridges API.
#[derive(Debug, Clone)]
pub struct DefiLlamaCollector {
    client: UpstreamClient,
}

impl DefiLlamaCollector {
    pub const NAME: &'static str = "defillama";

    pub fn new(config: UpstreamConfig) -> BridgeResult<Self> {
        Ok(Self {
            client: UpstreamClient::new(config)?,
        })
    }

    pub fn client(&self) -> &UpstreamClient {
        &self.client
    }
}

#[async_trait]
impl Collector for DefiLlamaCollector {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn list_all(&self) -> Vec<RawRecord> {
        self.client.get_catalogue().await.unwrap_or_default()
    }

    async fn bridge(&self, id: &str) -> Option<RawRecord> {
        self.client.get_bridge(id).await
    }

    async fn bridge_volume(&self, id: &str) -> Option<Value> {
        self.client.get_bridge_volume(id).await
    }
}
