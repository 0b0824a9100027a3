//! HTTP retrieval of the outage feed.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{ProviderError, ProviderResult};

/// Connection settings for [`FeedClient`].
#[derive(Debug, Clone)]
pub struct FeedClientConfig {
    pub url: Url,
    /// Upper bound on one whole request; the only guard against a hung cycle.
    pub timeout: Duration,
    pub user_agent: String,
}

impl FeedClientConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration for the given feed URL.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL is invalid or not http(s).
    pub fn new(url: impl AsRef<str>) -> ProviderResult<Self> {
        let parsed = Url::parse(url.as_ref()).map_err(|e| {
            ProviderError::configuration(format!("invalid feed URL '{}'", url.as_ref()))
                .with_source(e)
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ProviderError::configuration(format!(
                "unsupported feed URL scheme '{}'",
                parsed.scheme()
            )));
        }
        Ok(Self {
            url: parsed,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("outagenotifier/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Fetches the raw feed body over HTTP GET.
pub struct FeedClient {
    client: Client,
    config: FeedClientConfig,
}

impl FeedClient {
    pub fn new(config: FeedClientConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ProviderError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Downloads the feed and returns its body.
    ///
    /// Every failure here is a fetch error: nothing has been written yet.
    pub async fn fetch(&self) -> ProviderResult<String> {
        trace!(url = %self.config.url, "Fetching feed");

        let response = self
            .client
            .get(self.config.url.clone())
            .send()
            .await
            .map_err(|e| {
                let kind = if e.is_timeout() { "timed out" } else { "failed" };
                ProviderError::network(format!("Request to {} {}", self.config.url, kind))
                    .with_source(e)
            })?;

        let body = self.handle_response(response).await?;
        debug!(url = %self.config.url, bytes = body.len(), "Fetched feed");
        Ok(body)
    }

    async fn handle_response(&self, response: Response) -> ProviderResult<String> {
        let status = response.status();
        trace!(status = %status, "Received response");

        match status {
            StatusCode::OK => response.text().await.map_err(|e| {
                ProviderError::network(format!("Failed to read response: {}", e)).with_source(e)
            }),
            s if s.is_server_error() => Err(ProviderError::server(format!(
                "Server error ({}) from {}",
                s, self.config.url
            ))),
            s => {
                warn!(status = %s, url = %self.config.url, "Unexpected response status");
                Err(ProviderError::not_found(format!(
                    "Unexpected status {} from {}",
                    s, self.config.url
                )))
            }
        }
    }

    pub fn url(&self) -> &Url {
        &self.config.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;

    #[test]
    fn config_defaults() {
        let config = FeedClientConfig::new("http://example.org/calendar/export.ics").unwrap();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("outagenotifier/"));
    }

    #[test]
    fn config_rejects_bad_urls() {
        let err = FeedClientConfig::new("not a url").unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);

        let err = FeedClientConfig::new("file:///etc/passwd").unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
    }

    #[test]
    fn client_creation() {
        let config = FeedClientConfig::new("https://example.org/rss.xml")
            .unwrap()
            .with_timeout(Duration::from_secs(5));
        let client = FeedClient::new(config).unwrap();
        assert_eq!(client.url().as_str(), "https://example.org/rss.xml");
    }

    #[tokio::test]
    async fn unreachable_host_is_fetch_error() {
        // Port 9 on localhost is reserved for discard and normally closed.
        let config = FeedClientConfig::new("http://127.0.0.1:9/export.ics")
            .unwrap()
            .with_timeout(Duration::from_secs(2));
        let client = FeedClient::new(config).unwrap();
        let err = client.fetch().await.unwrap_err();
        assert!(err.is_fetch_error());
    }
}
