//! Search request body

use serde::Deserialize;

use super::error::ApiError;
use crate::domain::generation::{ActionKind, GenerationRequest};

/// Body of `POST /api/search` and `POST /api/search/stream`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub limit: Option<usize>,
    /// Action name; `search` when absent
    #[serde(default)]
    pub action_type: Option<String>,
    #[serde(default)]
    pub document_text: Option<String>,
}

impl TryFrom<SearchRequest> for GenerationRequest {
    type Error = ApiError;

    fn try_from(body: SearchRequest) -> Result<Self, Self::Error> {
        let action = match body.action_type.as_deref().map(str::trim) {
            None | Some("") => ActionKind::default(),
            Some(name) => name
                .parse::<ActionKind>()
                .map_err(|e| ApiError::from(e).with_param("action_type"))?,
        };

        let mut request = GenerationRequest::new(body.query, action);
        request.document_text = body.document_text;
        request.limit = body.limit;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn body(json: serde_json::Value) -> SearchRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_action_defaults_to_search() {
        let request = GenerationRequest::try_from(body(serde_json::json!({"query": "fees"}))).unwrap();

        assert_eq!(request.action, ActionKind::Search);
        assert!(request.limit.is_none());
    }

    #[test]
    fn test_conflict_request_carries_document_text() {
        let request = GenerationRequest::try_from(body(serde_json::json!({
            "query": "check",
            "action_type": "check_conflicts",
            "document_text": "Draft order text",
            "limit": 3
        })))
        .unwrap();

        assert_eq!(request.action, ActionKind::CheckConflicts);
        assert_eq!(request.subject(), "Draft order text");
        assert_eq!(request.limit, Some(3));
    }

    #[test]
    fn test_unknown_action_is_bad_request() {
        let err = GenerationRequest::try_from(body(serde_json::json!({
            "query": "fees",
            "action_type": "summarize"
        })))
        .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.param.as_deref(), Some("action_type"));
        assert!(err.response.error.message.contains("summarize"));
    }
}
