//! Domain layer - Core business logic and entities

pub mod cache;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod knowledge_base;
pub mod llm;

pub use cache::{CacheEntry, CacheKey, ResponseStore, StorageError};
pub use embedding::EmbeddingProvider;
pub use error::DomainError;
pub use generation::{
    ActionKind, Answer, AnswerChunk, AnswerSource, AnswerStream, GenerationRequest, PromptTemplate,
};
pub use knowledge_base::{DocumentRetriever, MetadataValue, RetrievedDocument};
pub use llm::{
    FinishReason, LlmProvider, LlmRequest, LlmRequestBuilder, LlmStream, Message, MessageRole,
    StreamChunk,
};
