//! HTTP client for the remote quote collection.
//!
//! The remote is a plain JSON collection endpoint: `GET` lists every record,
//! `POST` creates one and returns its assigned id. All transport failures
//! are reported as `RemoteUnavailable` so the sync engine can degrade.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;

use quotesync_core::errors::{Error, Result};
use quotesync_core::sync::QuoteApiClient;
use quotesync_core::Quote;

use crate::mapping::{post_from_quote, quote_from_post, ApiCreatedPost, ApiPost};

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default collection endpoint.
pub const DEFAULT_API_URL: &str = "https://jsonplaceholder.typicode.com/posts";

/// HTTP client for the remote quote collection.
///
/// # Example
///
/// ```ignore
/// let client = HttpQuoteApiClient::new("https://jsonplaceholder.typicode.com/posts", 1)?;
/// let quotes = client.fetch_quotes().await?;
/// ```
#[derive(Debug, Clone)]
pub struct HttpQuoteApiClient {
    client: reqwest::Client,
    endpoint: String,
    user_id: i64,
}

impl HttpQuoteApiClient {
    /// Create a client with the default request timeout.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - The collection URL (e.g., "https://jsonplaceholder.typicode.com/posts")
    /// * `user_id` - Owner id sent with every created record
    pub fn new(endpoint: &str, user_id: i64) -> Result<Self> {
        Self::with_timeout(endpoint, user_id, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(endpoint: &str, user_id: i64, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::RemoteUnavailable(format!("Failed to initialize HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            user_id,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Create default headers for API requests.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=UTF-8"),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Parse an HTTP response, treating any non-2xx status as unavailable.
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::RemoteUnavailable(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::RemoteUnavailable(format!(
                "API error {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            Error::RemoteUnavailable(format!(
                "Failed to parse response: {} - {}",
                e,
                body.chars().take(200).collect::<String>()
            ))
        })
    }
}

#[async_trait]
impl QuoteApiClient for HttpQuoteApiClient {
    /// GET <endpoint>
    async fn fetch_quotes(&self) -> Result<Vec<Quote>> {
        debug!("[QuoteApi] GET {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .headers(self.headers())
            .send()
            .await
            .map_err(|e| Error::RemoteUnavailable(format!("Request failed: {}", e)))?;

        let posts: Vec<ApiPost> = Self::parse_response(response).await?;
        let total = posts.len();
        let quotes: Vec<Quote> = posts.into_iter().filter_map(quote_from_post).collect();

        info!(
            "[QuoteApi] Fetched {} remote quotes ({} records)",
            quotes.len(),
            total
        );
        Ok(quotes)
    }

    /// POST <endpoint>
    async fn create_quote(&self, quote: &Quote) -> Result<i64> {
        debug!("[QuoteApi] POST {} \"{}\"", self.endpoint, quote.text);

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers())
            .json(&post_from_quote(quote, self.user_id))
            .send()
            .await
            .map_err(|e| Error::RemoteUnavailable(format!("Request failed: {}", e)))?;

        let created: ApiCreatedPost = Self::parse_response(response).await?;
        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpQuoteApiClient::new(DEFAULT_API_URL, 1);
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_url_normalization() {
        let client = HttpQuoteApiClient::new("https://example.com/posts/", 1).unwrap();
        assert_eq!(client.endpoint(), "https://example.com/posts");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_remote_unavailable() {
        let client = HttpQuoteApiClient::with_timeout(
            "http://127.0.0.1:9/posts",
            1,
            Duration::from_millis(500),
        )
        .unwrap();

        assert!(matches!(
            client.fetch_quotes().await,
            Err(Error::RemoteUnavailable(_))
        ));
        let quote = Quote::new_local("a", "b").unwrap();
        assert!(matches!(
            client.create_quote(&quote).await,
            Err(Error::RemoteUnavailable(_))
        ));
    }
}
