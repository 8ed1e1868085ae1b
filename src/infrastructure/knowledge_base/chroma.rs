//! Chroma vector index retriever

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::domain::embedding::EmbeddingProvider;
use crate::domain::knowledge_base::{DocumentRetriever, MetadataValue, RetrievedDocument};
use crate::domain::DomainError;
use crate::infrastructure::llm::HttpClientTrait;

pub const DEFAULT_CHROMA_URL: &str = "http://localhost:8000";
pub const DEFAULT_COLLECTION: &str = "admin_docs";

/// Configuration for the Chroma retriever
#[derive(Debug, Clone)]
pub struct ChromaConfig {
    pub base_url: String,
    pub collection: String,
}

impl Default for ChromaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CHROMA_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

impl ChromaConfig {
    pub fn new(base_url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            collection: collection.into(),
        }
    }
}

/// Retriever over a Chroma collection, embedding queries client-side
pub struct ChromaRetriever<C: HttpClientTrait> {
    client: C,
    config: ChromaConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    collection_id: OnceCell<String>,
}

impl<C: HttpClientTrait> Debug for ChromaRetriever<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromaRetriever")
            .field("base_url", &self.config.base_url)
            .field("collection", &self.config.collection)
            .field("embedding_model", &self.embedder.model())
            .finish()
    }
}

impl<C: HttpClientTrait> ChromaRetriever<C> {
    pub fn new(client: C, config: ChromaConfig, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            client,
            config,
            embedder,
            collection_id: OnceCell::new(),
        }
    }

    fn collections_url(&self) -> String {
        format!("{}/api/v1/collections", self.config.base_url)
    }

    fn query_url(&self, id: &str) -> String {
        format!("{}/api/v1/collections/{}/query", self.config.base_url, id)
    }

    /// Resolves the collection id once, creating the collection if needed
    async fn collection_id(&self) -> Result<&str, DomainError> {
        let id = self
            .collection_id
            .get_or_try_init(|| async {
                let body = serde_json::json!({
                    "name": self.config.collection,
                    "get_or_create": true,
                });

                let response = self
                    .client
                    .post_json(&self.collections_url(), &body)
                    .await
                    .map_err(|e| DomainError::retrieval(format!("Collection lookup failed: {}", e)))?;

                let collection: ChromaCollection = serde_json::from_value(response)
                    .map_err(|e| DomainError::retrieval(format!("Invalid collection response: {}", e)))?;

                info!(
                    collection = %self.config.collection,
                    id = %collection.id,
                    "Connected to Chroma collection"
                );
                Ok::<_, DomainError>(collection.id)
            })
            .await?;

        Ok(id.as_str())
    }
}

#[async_trait]
impl<C: HttpClientTrait> DocumentRetriever for ChromaRetriever<C> {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<RetrievedDocument>, DomainError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| DomainError::retrieval(format!("Query embedding failed: {}", e)))?;

        let id = self.collection_id().await?;
        let body = serde_json::json!({
            "query_embeddings": [embedding],
            "n_results": limit,
            "include": ["documents", "metadatas", "distances"],
        });

        let response = self
            .client
            .post_json(&self.query_url(id), &body)
            .await
            .map_err(|e| DomainError::retrieval(format!("Vector query failed: {}", e)))?;

        let parsed: ChromaQueryResponse = serde_json::from_value(response)
            .map_err(|e| DomainError::retrieval(format!("Invalid query response: {}", e)))?;

        let documents = parsed.into_documents();
        debug!(results = documents.len(), limit, "Chroma query completed");

        Ok(documents)
    }

    fn retriever_type(&self) -> &'static str {
        "chroma"
    }
}

#[derive(Debug, Deserialize)]
struct ChromaCollection {
    id: String,
}

/// Query results, one inner list per query embedding
#[derive(Debug, Deserialize)]
struct ChromaQueryResponse {
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<HashMap<String, serde_json::Value>>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<Option<f32>>>>,
}

impl ChromaQueryResponse {
    fn into_documents(self) -> Vec<RetrievedDocument> {
        let texts = first_row(self.documents);
        let mut metadatas = first_row(self.metadatas).into_iter();
        let mut distances = first_row(self.distances).into_iter();

        texts
            .into_iter()
            .filter_map(|text| {
                let metadata = metadatas.next().flatten();
                let distance = distances.next().flatten();
                let text = text?;

                let mut doc = RetrievedDocument::new(text);
                doc.metadata = convert_metadata(metadata.unwrap_or_default());
                doc.distance = distance;
                Some(doc)
            })
            .collect()
    }
}

fn first_row<T>(rows: Option<Vec<Vec<T>>>) -> Vec<T> {
    rows.and_then(|r| r.into_iter().next()).unwrap_or_default()
}

fn convert_metadata(raw: HashMap<String, serde_json::Value>) -> HashMap<String, MetadataValue> {
    raw.into_iter()
        .filter_map(|(key, value)| {
            serde_json::from_value::<MetadataValue>(value)
                .ok()
                .map(|value| (key, value))
        })
        .collect()
}
