/*
[INPUT]:  HTTP configuration (base URL, timeouts, archive route variant)
[OUTPUT]: Configured reqwest client ready for API calls
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::http::{BundleError, Result};
use crate::types::ErrorBody;

/// Default service address used when none is configured
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Append `/archive` to the download route
    pub archive_suffix: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            archive_suffix: false,
        }
    }
}

/// HTTP client for the package bundling service
#[derive(Debug, Clone)]
pub struct BundleClient {
    http_client: Client,
    base_url: Url,
    archive_suffix: bool,
}

impl BundleClient {
    /// Create a new client with default configuration
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(ClientConfig::default(), base_url)
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig, base_url: &str) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(BundleError::Config(format!(
                "base url cannot carry a path: {base_url}"
            )));
        }

        Ok(Self {
            http_client,
            base_url,
            archive_suffix: config.archive_suffix,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn archive_suffix(&self) -> bool {
        self.archive_suffix
    }

    /// Build full URL from path segments, percent-encoding each one
    pub(crate) fn endpoint_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BundleError::Config(format!("invalid base url: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Build request builder for an endpoint
    pub(crate) fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint_url(segments)?;
        Ok(self.http_client.request(method, url))
    }

    /// Send a request and return the response if the status is a success
    pub(crate) async fn send_checked(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|error| error.detail_text())
            .unwrap_or_else(|| body.trim().to_string());
        debug!(status = status.as_u16(), %message, "service returned error status");
        Err(BundleError::api_error(status, message))
    }

    /// Send a request and decode a JSON body
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send_checked(builder).await?;
        let bytes = response.bytes().await?;
        let value = serde_json::from_slice(&bytes)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_encodes_segments() {
        let client = BundleClient::new("http://localhost:8000").expect("client init");
        let url = client
            .endpoint_url(&["api", "tasks", "a b/c"])
            .expect("endpoint url");
        assert_eq!(url.as_str(), "http://localhost:8000/api/tasks/a%20b%2Fc");
    }

    #[test]
    fn test_endpoint_url_keeps_base_path() {
        let client = BundleClient::new("http://localhost:8000/bundler/").expect("client init");
        let url = client.endpoint_url(&["api", "tasks"]).expect("endpoint url");
        assert_eq!(url.as_str(), "http://localhost:8000/bundler/api/tasks");
    }

    #[test]
    fn test_rejects_non_base_url() {
        let err = BundleClient::new("mailto:ops@example.com").unwrap_err();
        assert!(matches!(err, BundleError::Config(_)));
    }
}
