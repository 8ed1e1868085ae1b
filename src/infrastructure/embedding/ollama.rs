//! Ollama embedding provider implementation

use async_trait::async_trait;
use serde::Deserialize;

use super::HttpClientTrait;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::DomainError;
use crate::infrastructure::llm::DEFAULT_OLLAMA_BASE_URL;

pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

/// Embeds text through Ollama's `/api/embeddings` endpoint
#[derive(Debug)]
pub struct OllamaEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    base_url: String,
    model: String,
}

impl<C: HttpClientTrait> OllamaEmbeddingProvider<C> {
    pub fn new(client: C) -> Self {
        Self::with_base_url(client, DEFAULT_OLLAMA_BASE_URL, DEFAULT_EMBEDDING_MODEL)
    }

    pub fn with_base_url(
        client: C,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            base_url,
            model: model.into(),
        }
    }

    fn embeddings_url(&self) -> String {
        format!("{}/api/embeddings", self.base_url)
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OllamaEmbeddingProvider<C> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": text,
        });

        let response = self.client.post_json(&self.embeddings_url(), &body).await?;

        let parsed: OllamaEmbeddingResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::provider("ollama", format!("Failed to parse embedding response: {}", e))
        })?;

        if parsed.embedding.is_empty() {
            return Err(DomainError::provider(
                "ollama",
                format!("Model {} returned an empty embedding", self.model),
            ));
        }

        Ok(parsed.embedding)
    }

    fn provider_name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::MockHttpClient;

    const TEST_URL: &str = "http://localhost:11434/api/embeddings";

    #[tokio::test]
    async fn test_embed() {
        let client = MockHttpClient::new()
            .with_response(TEST_URL, serde_json::json!({"embedding": [0.1, 0.2, 0.3]}));
        let provider = OllamaEmbeddingProvider::new(client);

        let vector = provider.embed("parking rules").await.unwrap();

        assert_eq!(vector.len(), 3);
        let (_, body) = provider.client.requests().pop().unwrap();
        assert_eq!(body["model"], DEFAULT_EMBEDDING_MODEL);
        assert_eq!(body["prompt"], "parking rules");
    }

    #[tokio::test]
    async fn test_empty_embedding_is_error() {
        let client =
            MockHttpClient::new().with_response(TEST_URL, serde_json::json!({"embedding": []}));
        let provider = OllamaEmbeddingProvider::new(client);

        assert!(provider.embed("text").await.is_err());
    }

    #[tokio::test]
    async fn test_custom_base_url_and_model() {
        let url = "http://embedder:9000/api/embeddings";
        let client = MockHttpClient::new().with_response(url, serde_json::json!({"embedding": [1.0]}));
        let provider = OllamaEmbeddingProvider::with_base_url(client, "http://embedder:9000/", "mxbai");

        assert_eq!(provider.model(), "mxbai");
        assert_eq!(provider.embed("x").await.unwrap(), vec![1.0]);
    }
}
