//! Async HTTP client for the bridge catalogue provider.
//!
//! One pooled `reqwest::Client` per instance, dropped with it. Every call
//! issues at most one request and never returns an error: failures are
//! logged on one line and reported as `None`.

use reqwest::Url;
use serde_json::Value;

use crate::config::UpstreamConfig;
use crate::types::{BridgeResult, RawRecord};

/// Transport or protocol failure of a single upstream request.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response has no '{0}' array")]
    MissingKey(&'static str),

    #[error("cannot build request URL: {0}")]
    Url(String),
}

/// HTTP client for the upstream provider.
#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    /// Create a client with pooled connections, the configured timeout, and
    /// the application user-agent.
    pub fn new(config: UpstreamConfig) -> BridgeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    /// Full catalogue from `GET /bridges`.
    pub async fn get_catalogue(&self) -> Option<Vec<RawRecord>> {
        let url = match self.endpoint(&["bridges"]) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, "bridge catalogue unavailable");
                return None;
            }
        };
        let result = self.fetch_json(url.clone()).await.and_then(|mut body| {
            match body.get_mut("bridges").map(Value::take) {
                Some(Value::Array(items)) => Ok(items.into_iter().map(RawRecord).collect::<Vec<_>>()),
                _ => Err(FetchError::MissingKey("bridges")),
            }
        });

        match result {
            Ok(records) => {
                tracing::info!(count = records.len(), "fetched bridge catalogue");
                Some(records)
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "bridge catalogue unavailable");
                None
            }
        }
    }

    /// Details for one bridge from `GET /bridge/{id}`.
    pub async fn get_bridge(&self, id: &str) -> Option<RawRecord> {
        self.get_opaque(&["bridge", id]).await.map(RawRecord)
    }

    /// Volume history for one bridge from `GET /bridgevolume/{id}`.
    pub async fn get_bridge_volume(&self, id: &str) -> Option<Value> {
        self.get_opaque(&["bridgevolume", id]).await
    }

    async fn get_opaque(&self, segments: &[&str]) -> Option<Value> {
        let result = match self.endpoint(segments) {
            Ok(url) => self.fetch_json(url).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!(path = %segments.join("/"), error = %e, "upstream request failed");
                None
            }
        }
    }

    /// Base URL extended by `segments`, each percent-encoded as exactly one
    /// path segment. Dot and empty segments are refused.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(FetchError::Url(format!("invalid path segment '{bad}'")));
        }

        let mut url = Url::parse(&self.config.base_url).map_err(|e| FetchError::Url(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Url(format!("{} cannot be a base", self.config.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn fetch_json(&self, url: Url) -> Result<Value, FetchError> {
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> UpstreamClient {
        UpstreamClient::new(UpstreamConfig::with_base_url(server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_catalogue_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bridges"))
            .and(header("user-agent", "XRSK-Platform/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "bridges": [{"id": 1, "name": "A"}, {"id": 2, "name": "B"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let records = client_for(&server).get_catalogue().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].field("name"), Some(&json!("A")));
    }

    #[tokio::test]
    async fn test_catalogue_non_2xx_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bridges"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        assert!(client_for(&server).get_catalogue().await.is_none());
    }

    #[tokio::test]
    async fn test_catalogue_non_json_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bridges"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        assert!(client_for(&server).get_catalogue().await.is_none());
    }

    #[tokio::test]
    async fn test_catalogue_missing_key_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bridges"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"chains": []})))
            .mount(&server)
            .await;

        assert!(client_for(&server).get_catalogue().await.is_none());
    }

    #[tokio::test]
    async fn test_connection_refused_is_none() {
        // Nothing listens on the discard port.
        let client = UpstreamClient::new(UpstreamConfig::with_base_url("http://127.0.0.1:9")).unwrap();
        assert!(client.get_catalogue().await.is_none());
        assert!(client.get_bridge("1").await.is_none());
    }

    #[tokio::test]
    async fn test_bridge_details_and_volume() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bridge/26"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 26, "displayName": "Hop", "chainBreakdown": {}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/bridgevolume/26"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"date": "1700000000", "depositUSD": 10.0, "withdrawUSD": 4.0}
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let details = client.get_bridge("26").await.unwrap();
        assert_eq!(details.field("displayName"), Some(&json!("Hop")));

        let volume = client.get_bridge_volume("26").await.unwrap();
        assert_eq!(volume.as_array().map(Vec::len), Some(1));

        assert!(client.get_bridge_volume("404").await.is_none());
    }

    #[tokio::test]
    async fn test_single_request_per_call_on_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bridges"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let _ = client_for(&server).get_catalogue().await;
        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
    }

    #[tokio::test]
    async fn test_bridge_id_stays_one_path_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"bridges": []})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let _ = client.get_bridge("../bridges?x=1").await;
        let _ = client.get_bridge_volume("a/b#c").await;

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].url.path(), "/bridge/..%2Fbridges%3Fx=1");
        assert_eq!(received[1].url.path(), "/bridgevolume/a%2Fb%23c");
        assert!(received.iter().all(|r| r.url.query().is_none()));
    }

    #[tokio::test]
    async fn test_dot_segments_are_refused_without_a_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.get_bridge("..").await.is_none());
        assert!(client.get_bridge(".").await.is_none());
        assert!(client.get_bridge_volume("").await.is_none());
    }

    #[test]
    fn test_builder_failure_is_an_error() {
        let config = UpstreamConfig {
            user_agent: "bad\nagent".to_string(),
            ..UpstreamConfig::default()
        };
        let err = UpstreamClient::new(config).unwrap_err();
        assert!(matches!(err, crate::types::BridgeError::Http(_)));
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client =
            UpstreamClient::new(UpstreamConfig::with_base_url("http://127.0.0.1:9/api/")).unwrap();
        let url = client.endpoint(&["bridge", "26"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9/api/bridge/26");
    }
}
