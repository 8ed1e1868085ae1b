use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use std::time::Duration;

use crate::domain::DomainError;

/// Stream type for HTTP responses
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, DomainError>> + Send>>;

/// Trait for HTTP client operations (for mocking)
///
/// Errors carry the provider name given by the caller so that retrieval and
/// generation failures can be told apart upstream.
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError>;

    async fn post_json_stream(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<ByteStream, DomainError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Client whose requests time out after `timeout`
    ///
    /// For streaming calls the timeout covers the whole body, so it must be
    /// long enough for a full generation.
    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn send(&self, url: &str, body: &serde_json::Value) -> Result<reqwest::Response, DomainError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| DomainError::provider("http", format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(DomainError::provider(
                "http",
                format!("HTTP {}: {}", status, error_body),
            ));
        }

        Ok(response)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError> {
        self.send(url, body)
            .await?
            .json()
            .await
            .map_err(|e| DomainError::provider("http", format!("Failed to parse response: {}", e)))
    }

    async fn post_json_stream(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<ByteStream, DomainError> {
        let response = self.send(url, body).await?;

        use futures::StreamExt;
        let stream = response.bytes_stream().map(|result| {
            result.map_err(|e| DomainError::provider("http", format!("Stream error: {}", e)))
        });

        Ok(Box::pin(stream))
    }
}
