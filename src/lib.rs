//! Handbook RAG
//!
//! Question answering over a corpus of administrative documents:
//! - retrieval from a Chroma collection with Ollama query embeddings
//! - streamed generation through Ollama for reports, spelling and conflict checks
//! - a two-tier answer cache (in-memory LRU over SQLite)

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::AppState;
use infrastructure::{
    cache::{CacheManager, SqliteResponseStore, SqliteStoreConfig},
    embedding::OllamaEmbeddingProvider,
    knowledge_base::{ChromaConfig, ChromaRetriever},
    llm::{HttpClient, OllamaProvider},
    services::{GenerationConfig, GenerationPipeline},
};
use tracing::info;

/// Create the application state with the default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state from `config`
///
/// An unusable cache database does not fail startup; the cache then runs on
/// its memory tier alone.
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let http = HttpClient::with_timeout(Duration::from_secs(config.llm.timeout_secs))?;

    let store_config = SqliteStoreConfig::new(&config.cache.db_path)
        .with_max_connections(config.cache.max_connections);
    let store = SqliteResponseStore::open(&store_config).await;
    let cache = Arc::new(CacheManager::new(
        Arc::new(store),
        config.cache.memory_capacity,
    ));

    let embedder = Arc::new(OllamaEmbeddingProvider::with_base_url(
        http.clone(),
        &config.retrieval.embedding_url,
        &config.retrieval.embedding_model,
    ));
    let retriever = Arc::new(ChromaRetriever::new(
        http.clone(),
        ChromaConfig::new(&config.retrieval.chroma_url, &config.retrieval.collection),
        embedder,
    ));
    let llm = Arc::new(OllamaProvider::with_base_url(http, &config.llm.base_url));

    let generation = GenerationConfig {
        model: config.llm.model.clone(),
        temperature: config.llm.temperature,
        num_ctx: config.llm.num_ctx,
        context_documents: config.retrieval.context_documents,
        default_limit: config.retrieval.default_limit,
        stream_buffer: config.pipeline.stream_buffer,
    };

    info!(
        model = %generation.model,
        collection = %config.retrieval.collection,
        cache_db = %config.cache.db_path.display(),
        memory_capacity = config.cache.memory_capacity,
        "Application state initialized"
    );

    Ok(AppState::new(GenerationPipeline::new(
        cache, retriever, llm, generation,
    )))
}
