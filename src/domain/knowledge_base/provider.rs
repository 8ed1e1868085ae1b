//! Document retrieval trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::document::RetrievedDocument;
use crate::domain::error::DomainError;

/// Vector search over the document corpus
///
/// An empty result is a normal outcome, never an error. Errors are reserved
/// for an unreachable or misbehaving index.
#[async_trait]
pub trait DocumentRetriever: Send + Sync + Debug {
    /// Returns up to `limit` documents ranked by relevance to `query`
    async fn search(&self, query: &str, limit: usize)
        -> Result<Vec<RetrievedDocument>, DomainError>;

    /// Get the retriever type name
    fn retriever_type(&self) -> &'static str;
}
