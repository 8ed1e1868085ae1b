//! Search and answer endpoints

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream, StreamExt};
use serde::Serialize;
use tracing::info;

use super::state::AppState;
use super::types::{ApiError, Json, SearchRequest};
use crate::domain::generation::{
    ActionKind, Answer, AnswerChunk, AnswerSource, GenerationRequest,
};
use crate::domain::knowledge_base::RetrievedDocument;

/// `POST /api/search`: answers the request and returns the collected result
pub async fn search(
    State(state): State<AppState>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<Answer>, ApiError> {
    let request = GenerationRequest::try_from(body)?;
    let answer = state.pipeline.answer(request).await?;

    info!(
        action = %answer.action,
        source = ?answer.source,
        documents = answer.documents.len(),
        "Search answered"
    );
    Ok(Json(answer))
}

/// First event of a streamed answer
#[derive(Debug, Serialize)]
struct StreamMeta<'a> {
    action: ActionKind,
    source: AnswerSource,
    documents: &'a [RetrievedDocument],
}

/// `POST /api/search/stream`: answers the request as Server-Sent Events
///
/// Emits a `meta` event, one `data` event per fragment, `error` for a terminal
/// failure fragment and a final `done`. Dropping the connection drops the
/// answer stream, which cancels generation.
pub async fn search_stream(
    State(state): State<AppState>,
    Json(body): Json<SearchRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let request = GenerationRequest::try_from(body)?;
    let answer = state.pipeline.answer_stream(request).await?;

    let meta = Event::default().event("meta").json_data(StreamMeta {
        action: answer.action(),
        source: answer.source(),
        documents: answer.documents(),
    });

    let fragments = answer.map(|chunk| Ok::<_, axum::Error>(fragment_event(chunk)));
    let events = stream::once(async move { meta })
        .chain(fragments)
        .chain(stream::once(async {
            Ok(Event::default().event("done").data(""))
        }));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn fragment_event(chunk: AnswerChunk) -> Event {
    match chunk {
        AnswerChunk::Text(text) => Event::default().data(sse_lines(&text)),
        AnswerChunk::Error(text) => Event::default().event("error").data(sse_lines(&text)),
    }
}

/// Rewrites CR and CRLF line breaks as LF; `Event::data` splits on LF only
fn sse_lines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
