//! Generation request and answer types

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};

use super::ActionKind;
use crate::domain::knowledge_base::RetrievedDocument;

/// Renders an upstream failure as the trailing text fragment of an answer
pub fn error_fragment(message: &str) -> String {
    format!("\n[Error]: {}", message)
}

/// A question routed through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub query: String,
    #[serde(default)]
    pub action: ActionKind,
    /// Text checked by the conflict action instead of the query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl GenerationRequest {
    pub fn new(query: impl Into<String>, action: ActionKind) -> Self {
        Self {
            query: query.into(),
            action,
            document_text: None,
            limit: None,
        }
    }

    pub fn with_document_text(mut self, text: impl Into<String>) -> Self {
        self.document_text = Some(text.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Text the action operates on: the document text for conflict checks
    /// when one was supplied, otherwise the query
    pub fn subject(&self) -> &str {
        match (&self.action, self.document_text.as_deref()) {
            (ActionKind::CheckConflicts, Some(text)) if !text.trim().is_empty() => text.trim(),
            _ => self.query.trim(),
        }
    }
}

/// Where the text of an answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    /// Served from one of the cache tiers
    Cache,
    /// Produced by the language model
    Generated,
    /// Retrieval found nothing; a fixed message was returned
    NotFound,
    /// Search-only action, no text produced
    Documents,
    /// Generation failed; the text ends with an error fragment
    Failed,
}

/// One item of a streamed answer
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerChunk {
    Text(String),
    /// Terminal failure; carries the error fragment text
    Error(String),
}

impl AnswerChunk {
    pub fn text(&self) -> &str {
        match self {
            AnswerChunk::Text(text) | AnswerChunk::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, AnswerChunk::Error(_))
    }
}

/// Fully collected answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub action: ActionKind,
    pub source: AnswerSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub documents: Vec<RetrievedDocument>,
}

/// Lazily produced answer text plus what was known before streaming began
pub struct AnswerStream {
    action: ActionKind,
    source: AnswerSource,
    documents: Vec<RetrievedDocument>,
    inner: Pin<Box<dyn Stream<Item = AnswerChunk> + Send>>,
}

impl AnswerStream {
    pub fn new(
        action: ActionKind,
        source: AnswerSource,
        documents: Vec<RetrievedDocument>,
        inner: impl Stream<Item = AnswerChunk> + Send + 'static,
    ) -> Self {
        Self {
            action,
            source,
            documents,
            inner: Box::pin(inner),
        }
    }

    /// Stream that yields `text` as a single fragment
    pub fn ready(
        action: ActionKind,
        source: AnswerSource,
        documents: Vec<RetrievedDocument>,
        text: impl Into<String>,
    ) -> Self {
        let chunk = AnswerChunk::Text(text.into());
        Self::new(action, source, documents, stream::iter(vec![chunk]))
    }

    /// Stream with no text, used for search-only actions
    pub fn documents_only(action: ActionKind, documents: Vec<RetrievedDocument>) -> Self {
        Self::new(action, AnswerSource::Documents, documents, stream::empty())
    }

    pub fn action(&self) -> ActionKind {
        self.action
    }

    pub fn source(&self) -> AnswerSource {
        self.source
    }

    pub fn documents(&self) -> &[RetrievedDocument] {
        &self.documents
    }

    /// Drains the stream into an [`Answer`]
    pub async fn collect_answer(mut self) -> Answer {
        let mut content = String::new();
        let mut failed = false;

        while let Some(chunk) = self.inner.next().await {
            failed |= chunk.is_error();
            content.push_str(chunk.text());
        }

        let source = if failed {
            AnswerSource::Failed
        } else {
            self.source
        };
        let content = match source {
            AnswerSource::Documents => None,
            _ => Some(content),
        };

        Answer {
            action: self.action,
            source,
            content,
            documents: self.documents,
        }
    }
}

impl Stream for AnswerStream {
    type Item = AnswerChunk;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for AnswerStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerStream")
            .field("action", &self.action)
            .field("source", &self.source)
            .field("documents", &self.documents.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_prefers_document_text_for_conflicts() {
        let request = GenerationRequest::new("query", ActionKind::CheckConflicts)
            .with_document_text("  draft order text ");
        assert_eq!(request.subject(), "draft order text");

        let blank = GenerationRequest::new("query", ActionKind::CheckConflicts)
            .with_document_text("   ");
        assert_eq!(blank.subject(), "query");

        let report = GenerationRequest::new(" query ", ActionKind::Report)
            .with_document_text("ignored");
        assert_eq!(report.subject(), "query");
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let request: GenerationRequest =
            serde_json::from_value(serde_json::json!({"query": "parking"})).unwrap();

        assert_eq!(request.action, ActionKind::Search);
        assert!(request.limit.is_none());
    }

    #[tokio::test]
    async fn test_collect_concatenates_fragments() {
        let chunks = vec![
            AnswerChunk::Text("Hel".into()),
            AnswerChunk::Text("lo, ".into()),
            AnswerChunk::Text("world".into()),
        ];
        let stream = AnswerStream::new(
            ActionKind::Report,
            AnswerSource::Generated,
            vec![],
            stream::iter(chunks),
        );

        let answer = stream.collect_answer().await;

        assert_eq!(answer.content.as_deref(), Some("Hello, world"));
        assert_eq!(answer.source, AnswerSource::Generated);
    }

    #[tokio::test]
    async fn test_collect_marks_failure() {
        let chunks = vec![
            AnswerChunk::Text("partial".into()),
            AnswerChunk::Error(error_fragment("connection reset")),
        ];
        let stream = AnswerStream::new(
            ActionKind::Report,
            AnswerSource::Generated,
            vec![],
            stream::iter(chunks),
        );

        let answer = stream.collect_answer().await;

        assert_eq!(answer.source, AnswerSource::Failed);
        assert_eq!(
            answer.content.as_deref(),
            Some("partial\n[Error]: connection reset")
        );
    }

    #[tokio::test]
    async fn test_documents_only_has_no_content() {
        let docs = vec![RetrievedDocument::new("a")];
        let answer = AnswerStream::documents_only(ActionKind::Search, docs)
            .collect_answer()
            .await;

        assert_eq!(answer.source, AnswerSource::Documents);
        assert!(answer.content.is_none());
        assert_eq!(answer.documents.len(), 1);
    }
}
