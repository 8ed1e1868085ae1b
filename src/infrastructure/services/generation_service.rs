//! Retrieval-to-generation pipeline
//!
//! A request runs cache lookup, retrieval and prompt assembly before the
//! answer stream is returned. Generation itself happens in a spawned task that
//! forwards fragments through a bounded channel, aggregates them and writes the
//! full answer back to the cache once the model finishes cleanly.

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use metrics::{counter, histogram};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::domain::generation::{
    error_fragment, ActionKind, Answer, AnswerChunk, AnswerSource, AnswerStream,
    GenerationRequest, PromptTemplate,
};
use crate::domain::knowledge_base::{DocumentRetriever, RetrievedDocument};
use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::DomainError;
use crate::infrastructure::cache::CacheManager;

/// Upper bound for the number of documents a search may return
pub const MAX_SEARCH_LIMIT: usize = 50;

/// Pipeline tuning
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Model name passed to the provider
    pub model: String,
    pub temperature: f32,
    /// Context window requested from the model
    pub num_ctx: u32,
    /// Documents retrieved as context for generative actions
    pub context_documents: usize,
    /// Result count for search actions without an explicit limit
    pub default_limit: usize,
    /// Capacity of the fragment channel
    pub stream_buffer: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "llama3.1:8b".to_string(),
            temperature: 0.1,
            num_ctx: 4096,
            context_documents: 5,
            default_limit: 5,
            stream_buffer: 32,
        }
    }
}

/// Answers queries from the cache, the vector index and the language model
#[derive(Debug, Clone)]
pub struct GenerationPipeline {
    cache: Arc<CacheManager>,
    retriever: Arc<dyn DocumentRetriever>,
    llm: Arc<dyn LlmProvider>,
    config: GenerationConfig,
}

impl GenerationPipeline {
    pub fn new(
        cache: Arc<CacheManager>,
        retriever: Arc<dyn DocumentRetriever>,
        llm: Arc<dyn LlmProvider>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            cache,
            retriever,
            llm,
            config,
        }
    }

    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.cache
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Result count for a search, clamped to `1..=MAX_SEARCH_LIMIT`
    pub fn search_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.config.default_limit)
            .clamp(1, MAX_SEARCH_LIMIT)
    }

    /// Runs retrieval only
    pub async fn search(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<RetrievedDocument>, DomainError> {
        validate(request)?;

        let limit = self.search_limit(request.limit);
        let documents = self.retriever.search(request.subject(), limit).await?;

        info!(
            action = %request.action,
            limit,
            results = documents.len(),
            "Search completed"
        );
        Ok(documents)
    }

    /// Produces a fully aggregated answer
    pub async fn answer(&self, request: GenerationRequest) -> Result<Answer, DomainError> {
        Ok(self.answer_stream(request).await?.collect_answer().await)
    }

    /// Produces an answer as a stream of fragments
    ///
    /// Errors are returned only for invalid requests and retrieval failures.
    /// Generation failures arrive in-stream as a terminal error chunk.
    pub async fn answer_stream(
        &self,
        request: GenerationRequest,
    ) -> Result<AnswerStream, DomainError> {
        validate(&request)?;

        let action = request.action;
        let Some(template) = PromptTemplate::for_action(action) else {
            let documents = self.search(&request).await?;
            return Ok(AnswerStream::documents_only(action, documents));
        };

        let subject = request.subject().to_string();
        let cache_query = action
            .is_cached()
            .then(|| action.cache_query(&subject));

        if let Some(query) = cache_query.as_deref() {
            if let Some(hit) = self.cache.lookup(query).await {
                info!(action = %action, tier = ?hit.source, "Serving cached answer");
                return Ok(AnswerStream::ready(
                    action,
                    AnswerSource::Cache,
                    Vec::new(),
                    hit.value,
                ));
            }
        }

        let documents = if action.needs_retrieval() {
            let documents = self
                .retriever
                .search(&subject, self.config.context_documents)
                .await?;

            if documents.is_empty() {
                info!(action = %action, "No documents found, skipping generation");
                return Ok(AnswerStream::ready(
                    action,
                    AnswerSource::NotFound,
                    Vec::new(),
                    template.not_found_message(),
                ));
            }
            documents
        } else {
            Vec::new()
        };

        let context = template.render_context(&documents);
        let llm_request = LlmRequest::builder()
            .system(template.system_prompt())
            .user(template.render_user_message(&subject, &context))
            .temperature(self.config.temperature)
            .context_window(self.config.num_ctx)
            .build();

        debug!(
            action = %action,
            documents = documents.len(),
            context_chars = context.chars().count(),
            "Starting generation"
        );

        let receiver = self.spawn_generation(action, llm_request, cache_query);
        Ok(AnswerStream::new(
            action,
            AnswerSource::Generated,
            documents,
            ReceiverStream::new(receiver),
        ))
    }

    fn spawn_generation(
        &self,
        action: ActionKind,
        request: LlmRequest,
        cache_query: Option<String>,
    ) -> mpsc::Receiver<AnswerChunk> {
        let (tx, rx) = mpsc::channel(self.config.stream_buffer.max(1));
        let llm = self.llm.clone();
        let cache = self.cache.clone();
        let model = self.config.model.clone();

        tokio::spawn(async move {
            let started = Instant::now();

            let mut upstream = match llm.chat_stream(&model, request).await {
                Ok(stream) => stream,
                Err(e) => {
                    warn!(action = %action, error = %e, "Failed to start generation");
                    counter!("generation_failures_total", "stage" => "open").increment(1);
                    let _ = tx.send(AnswerChunk::Error(error_fragment(&e.to_string()))).await;
                    return;
                }
            };

            let mut full_answer = String::new();
            loop {
                let next = tokio::select! {
                    _ = tx.closed() => {
                        info!(action = %action, "Client went away, abandoning generation");
                        counter!("generation_cancelled_total").increment(1);
                        return;
                    }
                    next = upstream.next() => next,
                };

                match next {
                    Some(Ok(chunk)) => {
                        let is_final = chunk.is_final();
                        if let Some(delta) = chunk.delta.filter(|d| !d.is_empty()) {
                            full_answer.push_str(&delta);
                            if tx.send(AnswerChunk::Text(delta)).await.is_err() {
                                info!(action = %action, "Client went away, abandoning generation");
                                counter!("generation_cancelled_total").increment(1);
                                return;
                            }
                        }
                        if is_final {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        warn!(action = %action, error = %e, "Generation failed mid-stream");
                        counter!("generation_failures_total", "stage" => "stream").increment(1);
                        let _ = tx.send(AnswerChunk::Error(error_fragment(&e.to_string()))).await;
                        return;
                    }
                    None => break,
                }
            }
            drop(upstream);

            match cache_query {
                Some(query) if !full_answer.is_empty() => cache.set(&query, &full_answer).await,
                Some(_) => debug!(action = %action, "Empty answer, not cached"),
                None => {}
            }

            histogram!("generation_duration_seconds", "action" => action.as_str())
                .record(started.elapsed().as_secs_f64());
            info!(
                action = %action,
                chars = full_answer.chars().count(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Generation completed"
            );
        });

        rx
    }
}

fn validate(request: &GenerationRequest) -> Result<(), DomainError> {
    if request.subject().is_empty() {
        return Err(DomainError::validation("Query must not be empty"));
    }
    Ok(())
}
