use crate::core::FeedSource;
use crate::core::config::AmfiProviderConfig;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Downloads the AMFI bulk NAV file (`NAVAll.txt`).
///
/// The feed is fetched with a single request; callers treat any failure as
/// fatal for the batch.
pub struct AmfiProvider {
    feed_url: String,
    timeout: Duration,
}

impl AmfiProvider {
    pub fn new(feed_url: &str, timeout: Duration) -> Self {
        AmfiProvider {
            feed_url: feed_url.to_string(),
            timeout,
        }
    }

    pub fn from_config(config: &AmfiProviderConfig) -> Self {
        Self::new(&config.feed_url, config.timeout())
    }
}

#[async_trait]
impl FeedSource for AmfiProvider {
    async fn fetch_feed(&self) -> Result<String> {
        debug!("Requesting NAV feed from {}", self.feed_url);

        let client = reqwest::Client::builder()
            .user_agent("mfnav/0.1")
            .timeout(self.timeout)
            .build()?;

        let response = client
            .get(&self.feed_url)
            .send()
            .await
            .with_context(|| format!("Failed to send request for NAV feed: {}", self.feed_url))?
            .error_for_status()
            .with_context(|| format!("NAV feed request rejected: {}", self.feed_url))?;

        let feed_text = response.text().await.with_context(|| {
            format!("Failed to get response text for NAV feed: {}", self.feed_url)
        })?;

        if feed_text.trim().is_empty() {
            return Err(anyhow!("Received empty NAV feed from {}", self.feed_url));
        }

        debug!(bytes = feed_text.len(), "Fetched NAV feed");
        Ok(feed_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FEED_PATH: &str = "/spages/NAVAll.txt";

    // Helper function to create a mock server for the AMFI feed
    async fn create_amfi_mock_server(mock_response: &str, status_code: u16) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(FEED_PATH))
            .respond_with(ResponseTemplate::new(status_code).set_body_string(mock_response))
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn provider_for(mock_server: &MockServer) -> AmfiProvider {
        AmfiProvider::new(
            &format!("{}{FEED_PATH}", mock_server.uri()),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_successful_feed_fetch() {
        let feed =
            "119598;INF200K01QX4;-;SBI Bluechip Fund - Direct Plan - Growth;85.32;01-Jan-2024\n";
        let mock_server = create_amfi_mock_server(feed, 200).await;

        let provider = provider_for(&mock_server);
        let result = provider.fetch_feed().await.unwrap();
        assert_eq!(result, feed);
    }

    #[tokio::test]
    async fn test_feed_server_error() {
        let mock_server = create_amfi_mock_server("Server Error", 500).await;

        let provider = provider_for(&mock_server);
        let result = provider.fetch_feed().await;

        assert!(result.is_err());
        let error_msg = result.unwrap_err().to_string();
        assert!(error_msg.starts_with("NAV feed request rejected"), "{error_msg}");
    }

    #[tokio::test]
    async fn test_feed_is_requested_once_on_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(FEED_PATH))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server);
        assert!(provider.fetch_feed().await.is_err());
        mock_server.verify().await;
    }

    #[tokio::test]
    async fn test_empty_feed() {
        let mock_server = create_amfi_mock_server("  \n", 200).await;

        let provider = provider_for(&mock_server);
        let result = provider.fetch_feed().await;

        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            format!("Received empty NAV feed from {}{FEED_PATH}", mock_server.uri())
        );
    }

    #[tokio::test]
    async fn test_unreachable_feed() {
        let provider = AmfiProvider::new("http://127.0.0.1:1/NAVAll.txt", Duration::from_secs(1));
        let result = provider.fetch_feed().await;

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .starts_with("Failed to send request for NAV feed")
        );
    }

    #[test]
    fn test_from_config() {
        let provider = AmfiProvider::from_config(&AmfiProviderConfig::default());
        assert_eq!(provider.feed_url, crate::core::config::DEFAULT_FEED_URL);
        assert_eq!(provider.timeout, Duration::from_secs(30));
    }
}
