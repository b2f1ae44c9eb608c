//! Build-time configuration for the upstream provider and the shared cache.

use std::time::Duration;

/// Base URL of the bridge catalogue provider.
pub const BASE_URL: &str = "https://bridges.llama.fi";

/// User-Agent sent with every upstream request.
pub const USER_AGENT: &str = "XRSK-Platform/1.0";

/// Per-request timeout in milliseconds.
pub const REQUEST_TIMEOUT_MS: u64 = 10_000;

/// TTL applied by dashboard load functions.
pub const CACHE_TTL_SECS: u64 = 300;

/// Collector registered by default.
pub const DEFAULT_SOURCE: &str = "defillama";

/// Connection settings for the upstream HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl UpstreamConfig {
    /// Same settings as the default, pointed at another base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            timeout: Duration::from_millis(REQUEST_TIMEOUT_MS),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UpstreamConfig::default();
        assert_eq!(config.base_url, "https://bridges.llama.fi");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.user_agent, "XRSK-Platform/1.0");
    }

    #[test]
    fn test_with_base_url_trims_trailing_slash() {
        let config = UpstreamConfig::with_base_url("http://127.0.0.1:9000/");
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.user_agent, USER_AGENT);
    }
}
