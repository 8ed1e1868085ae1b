//! Hand-written fakes shared by the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;

use handbook_rag::domain::knowledge_base::{DocumentRetriever, RetrievedDocument};
use handbook_rag::domain::llm::{FinishReason, LlmProvider, LlmRequest, LlmStream, StreamChunk};
use handbook_rag::domain::DomainError;
use handbook_rag::infrastructure::cache::CacheManager;
use handbook_rag::infrastructure::services::{GenerationConfig, GenerationPipeline};

#[derive(Debug, Default)]
pub struct FakeRetriever {
    pub documents: Vec<RetrievedDocument>,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FakeRetriever {
    pub fn with_documents(documents: Vec<RetrievedDocument>) -> Self {
        Self {
            documents,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl DocumentRetriever for FakeRetriever {
    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<RetrievedDocument>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DomainError::retrieval("index unreachable"));
        }
        Ok(self.documents.iter().take(limit).cloned().collect())
    }

    fn retriever_type(&self) -> &'static str {
        "fake"
    }
}

/// Emits the fragments, then either finishes or fails
#[derive(Debug, Default)]
pub struct FakeLlm {
    pub fragments: Vec<String>,
    pub fail_with: Option<String>,
    pub calls: AtomicUsize,
}

impl FakeLlm {
    pub fn new(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn failing_after(fragments: &[&str], error: &str) -> Self {
        Self {
            fail_with: Some(error.to_string()),
            ..Self::new(fragments)
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for FakeLlm {
    async fn chat_stream(&self, model: &str, _request: LlmRequest) -> Result<LlmStream, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut items: Vec<Result<StreamChunk, DomainError>> = self
            .fragments
            .iter()
            .map(|f| Ok(StreamChunk::new(model).with_delta(f.clone())))
            .collect();

        match &self.fail_with {
            Some(message) => items.push(Err(DomainError::provider("fake", message.clone()))),
            None => items.push(Ok(StreamChunk::new(model).with_finish_reason(FinishReason::Stop))),
        }

        Ok(Box::pin(stream::iter(items)))
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

pub fn sample_documents() -> Vec<RetrievedDocument> {
    vec![
        RetrievedDocument::new("Parking is allowed on Lenina street.")
            .with_metadata("title", "Order on parking")
            .with_metadata("number", "12")
            .with_metadata("date", "2023-04-01"),
        RetrievedDocument::new("Fees are paid monthly.").with_metadata("title", "Fee schedule"),
    ]
}

pub fn pipeline(
    cache: Arc<CacheManager>,
    retriever: Arc<FakeRetriever>,
    llm: Arc<FakeLlm>,
) -> GenerationPipeline {
    GenerationPipeline::new(cache, retriever, llm, GenerationConfig::default())
}
