//! HTTP client against the deployment origin.
//!
//! ### Fetch semantics
//! - Any HTTP response resolves, error statuses included; the coordinator's
//!   strategies decide what a 404 means.
//! - Only transport failures (origin unreachable, timeout, reset) become
//!   `Error::Network`, which is what triggers the offline fallbacks.
//! - Non-GET pass-through forwards the request body unchanged.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, header};

use offramp_core::{Error, Network, ResourceRequest, ResourceResponse};

/// Configuration for the origin client.
#[derive(Debug, Clone)]
pub struct OriginConfig {
    /// User agent string (default: "offramp/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self { user_agent: "offramp/0.1".to_string(), timeout: Duration::from_millis(20_000), max_redirects: 5 }
    }
}

/// Origin-facing HTTP fetch client.
pub struct OriginClient {
    http: Client,
}

impl OriginClient {
    /// Create a new origin client with the given configuration.
    pub fn new(config: OriginConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Network for OriginClient {
    async fn fetch(&self, request: &ResourceRequest) -> Result<ResourceResponse, Error> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| Error::InvalidUrl(format!("bad method {}: {e}", request.method)))?;

        let mut builder = self.http.request(method, request.url.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Network(format!("origin unreachable: {e}")))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response body: {e}")))?;

        tracing::debug!(url = %request.url, status, bytes = body.len(), "origin fetch");

        Ok(ResourceResponse::new(status, content_type, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_config_default() {
        let config = OriginConfig::default();
        assert_eq!(config.user_agent, "offramp/0.1");
        assert_eq!(config.timeout, Duration::from_millis(20_000));
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_origin_client_new() {
        let client = OriginClient::new(OriginConfig::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_rejects_malformed_method() {
        let client = OriginClient::new(OriginConfig::default()).unwrap();
        let mut request = ResourceRequest::get(url::Url::parse("http://127.0.0.1:1/x").unwrap());
        request.method = "GE T".into();

        let result = client.fetch(&request).await;
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }
}
