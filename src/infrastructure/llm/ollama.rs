use std::collections::VecDeque;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http_client::{ByteStream, HttpClientTrait};
use crate::domain::{
    DomainError, FinishReason, LlmProvider, LlmRequest, LlmStream, Message, StreamChunk,
};

pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Ollama chat provider streaming newline-delimited JSON
#[derive(Debug)]
pub struct OllamaProvider<C: HttpClientTrait> {
    client: C,
    base_url: String,
}

impl<C: HttpClientTrait> OllamaProvider<C> {
    pub fn new(client: C) -> Self {
        Self::with_base_url(client, DEFAULT_OLLAMA_BASE_URL)
    }

    pub fn with_base_url(client: C, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    fn build_request(&self, model: &str, request: &LlmRequest) -> serde_json::Value {
        let messages: Vec<OllamaMessage> =
            request.messages.iter().map(OllamaMessage::from_domain).collect();

        let mut options = serde_json::Map::new();
        if let Some(temp) = request.temperature {
            options.insert("temperature".into(), serde_json::json!(temp));
        }
        if let Some(num_ctx) = request.context_window {
            options.insert("num_ctx".into(), serde_json::json!(num_ctx));
        }
        if let Some(max_tokens) = request.max_tokens {
            options.insert("num_predict".into(), serde_json::json!(max_tokens));
        }

        serde_json::json!({
            "model": model,
            "messages": messages,
            "stream": true,
            "options": options,
        })
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for OllamaProvider<C> {
    async fn chat_stream(
        &self,
        model: &str,
        request: LlmRequest,
    ) -> Result<LlmStream, DomainError> {
        let url = self.chat_url();
        let body = self.build_request(model, &request);

        debug!(model, messages = request.messages.len(), "Opening Ollama chat stream");

        let bytes = self.client.post_json_stream(&url, &body).await?;
        Ok(parse_ndjson_stream(bytes, model))
    }

    fn provider_name(&self) -> &'static str {
        "ollama"
    }
}

/// Splits the byte stream into lines and turns each into a chunk
///
/// Lines may arrive split across network reads, so bytes are buffered until a
/// newline is seen. Decoding happens per line to keep multi-byte characters
/// intact. The stream ends after the `done` line or the first error.
fn parse_ndjson_stream(bytes: ByteStream, model: &str) -> LlmStream {
    let state = NdjsonState {
        bytes,
        buffer: Vec::new(),
        pending: VecDeque::new(),
        finished: false,
        model: model.to_string(),
    };

    let stream = stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    state.buffer.extend_from_slice(&chunk);
                    state.drain_lines();
                }
                Some(Err(e)) => state.fail(e),
                None => {
                    let rest = std::mem::take(&mut state.buffer);
                    state.handle_line(&rest);
                    if !state.finished {
                        state.fail(DomainError::provider(
                            "ollama",
                            "Stream ended before completion",
                        ));
                    }
                }
            }
        }
    });

    Box::pin(stream)
}

struct NdjsonState {
    bytes: ByteStream,
    buffer: Vec<u8>,
    pending: VecDeque<Result<StreamChunk, DomainError>>,
    finished: bool,
    model: String,
}

impl NdjsonState {
    fn drain_lines(&mut self) {
        while !self.finished {
            let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') else {
                break;
            };
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.handle_line(&line[..pos]);
        }
    }

    fn handle_line(&mut self, line: &[u8]) {
        if self.finished {
            return;
        }

        let text = String::from_utf8_lossy(line);
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        let parsed: OllamaChatChunk = match serde_json::from_str(text) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.fail(DomainError::provider(
                    "ollama",
                    format!("Invalid stream line: {}", e),
                ));
                return;
            }
        };

        if let Some(error) = parsed.error {
            self.fail(DomainError::provider("ollama", error));
            return;
        }

        let mut chunk = StreamChunk::new(parsed.model.unwrap_or_else(|| self.model.clone()));
        if let Some(content) = parsed.message.map(|m| m.content).filter(|c| !c.is_empty()) {
            chunk = chunk.with_delta(content);
        }

        if parsed.done {
            chunk = chunk.with_finish_reason(parse_done_reason(parsed.done_reason.as_deref()));
            self.finished = true;
        }

        if chunk.delta.is_some() || chunk.is_final() {
            self.pending.push_back(Ok(chunk));
        }
    }

    fn fail(&mut self, error: DomainError) {
        self.pending.push_back(Err(error));
        self.finished = true;
    }
}

fn parse_done_reason(reason: Option<&str>) -> FinishReason {
    match reason {
        Some("length") => FinishReason::Length,
        _ => FinishReason::Stop,
    }
}

#[derive(Debug, Serialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

impl OllamaMessage {
    fn from_domain(message: &Message) -> Self {
        Self {
            role: message.role.as_str().to_string(),
            content: message.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OllamaChatChunk {
    model: Option<String>,
    message: Option<OllamaChunkMessage>,
    #[serde(default)]
    done: bool,
    done_reason: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaChunkMessage {
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;
    use bytes::Bytes;

    const TEST_URL: &str = "http://localhost:11434/api/chat";

    fn line(content: &str, done: bool) -> String {
        if done {
            format!(
                "{{\"model\":\"llama3.1:8b\",\"message\":{{\"role\":\"assistant\",\"content\":\"{}\"}},\"done\":true,\"done_reason\":\"stop\"}}\n",
                content
            )
        } else {
            format!(
                "{{\"model\":\"llama3.1:8b\",\"message\":{{\"role\":\"assistant\",\"content\":\"{}\"}},\"done\":false}}\n",
                content
            )
        }
    }

    async fn collect(provider: &OllamaProvider<MockHttpClient>) -> Vec<Result<StreamChunk, DomainError>> {
        let request = LlmRequest::builder().user("Hello").build();
        let stream = provider.chat_stream("llama3.1:8b", request).await.unwrap();
        stream.collect().await
    }

    fn text_of(items: &[Result<StreamChunk, DomainError>]) -> String {
        items
            .iter()
            .filter_map(|item| item.as_ref().ok())
            .filter_map(|chunk| chunk.delta.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_stream_fragments_in_order() {
        let body = format!("{}{}{}", line("Hel", false), line("lo", false), line("", true));
        let client =
            MockHttpClient::new().with_stream_response(TEST_URL, vec![Bytes::from(body)]);
        let provider = OllamaProvider::new(client);

        let items = collect(&provider).await;

        assert_eq!(text_of(&items), "Hello");
        let last = items.last().unwrap().as_ref().unwrap();
        assert_eq!(last.finish_reason, Some(FinishReason::Stop));
    }

    #[tokio::test]
    async fn test_lines_split_across_reads() {
        let body = format!("{}{}", line("Привет", false), line("!", true));
        let bytes = body.as_bytes();
        // Split inside the first multi-byte character
        let cut = body.find("Привет").unwrap() + 1;
        let chunks = vec![
            Bytes::copy_from_slice(&bytes[..cut]),
            Bytes::copy_from_slice(&bytes[cut..]),
        ];
        let client = MockHttpClient::new().with_stream_response(TEST_URL, chunks);
        let provider = OllamaProvider::new(client);

        let items = collect(&provider).await;

        assert!(items.iter().all(|item| item.is_ok()));
        assert_eq!(text_of(&items), "Привет!");
    }

    #[tokio::test]
    async fn test_error_line_ends_stream() {
        let body = format!(
            "{}{{\"error\":\"model runner crashed\"}}\n{}",
            line("partial", false),
            line("ignored", true)
        );
        let client =
            MockHttpClient::new().with_stream_response(TEST_URL, vec![Bytes::from(body)]);
        let provider = OllamaProvider::new(client);

        let items = collect(&provider).await;

        assert_eq!(items.len(), 2);
        assert_eq!(text_of(&items), "partial");
        let err = items[1].as_ref().unwrap_err();
        assert!(err.to_string().contains("model runner crashed"));
    }

    #[tokio::test]
    async fn test_truncated_stream_is_error() {
        let body = line("partial", false);
        let client =
            MockHttpClient::new().with_stream_response(TEST_URL, vec![Bytes::from(body)]);
        let provider = OllamaProvider::new(client);

        let items = collect(&provider).await;

        assert!(items.last().unwrap().is_err());
    }

    #[tokio::test]
    async fn test_request_body() {
        let client = MockHttpClient::new()
            .with_stream_response(TEST_URL, vec![Bytes::from(line("", true))]);
        let provider = OllamaProvider::new(client);
        let request = LlmRequest::builder()
            .system("Be brief")
            .user("Question")
            .temperature(0.1)
            .context_window(4096)
            .build();

        let stream = provider.chat_stream("llama3.1:8b", request).await.unwrap();
        let _: Vec<_> = stream.collect().await;

        let (url, body) = provider.client.requests().pop().unwrap();
        assert_eq!(url, TEST_URL);
        assert_eq!(body["model"], "llama3.1:8b");
        assert_eq!(body["stream"], true);
        assert_eq!(body["options"]["num_ctx"], 4096);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Question");
    }

    #[tokio::test]
    async fn test_open_error() {
        let client = MockHttpClient::new().with_error(TEST_URL, "connection refused");
        let provider = OllamaProvider::new(client);

        let request = LlmRequest::builder().user("Hello").build();
        assert!(provider.chat_stream("llama3.1:8b", request).await.is_err());
    }
}
