//! Configuration loading and resolution.

use std::time::Duration;

use xrsk_bridges::config::{CACHE_TTL_SECS, DEFAULT_SOURCE};
use xrsk_bridges::UpstreamConfig;

/// Settings for one dashboard process.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Registry name of the collector to read from.
    pub source: String,
    /// Lifetime of memoised load results.
    pub ttl: Duration,
    pub upstream: UpstreamConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            ttl: Duration::from_secs(CACHE_TTL_SECS),
            upstream: UpstreamConfig::default(),
        }
    }
}

/// Resolve the collector name: explicit flag, then `XRSK_SOURCE`, then the default.
pub fn resolve_source(explicit: Option<&str>) -> String {
    if let Some(source) = explicit {
        return source.to_string();
    }

    if let Ok(env_source) = std::env::var("XRSK_SOURCE") {
        if !env_source.trim().is_empty() {
            return env_source;
        }
    }

    DEFAULT_SOURCE.to_string()
}
