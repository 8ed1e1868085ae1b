//! Action kinds accepted by the question-answering backend

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// What the caller wants done with a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    #[default]
    Search,
    FindExample,
    FindRelated,
    Report,
    CheckSpelling,
    CheckConflicts,
}

impl ActionKind {
    pub const ALL: [ActionKind; 6] = [
        ActionKind::Search,
        ActionKind::FindExample,
        ActionKind::FindRelated,
        ActionKind::Report,
        ActionKind::CheckSpelling,
        ActionKind::CheckConflicts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Search => "search",
            ActionKind::FindExample => "find_example",
            ActionKind::FindRelated => "find_related",
            ActionKind::Report => "report",
            ActionKind::CheckSpelling => "check_spelling",
            ActionKind::CheckConflicts => "check_conflicts",
        }
    }

    /// Namespace tag prefixed to the query before key derivation
    pub fn tag(&self) -> &'static str {
        match self {
            ActionKind::Search => "search",
            ActionKind::FindExample => "example",
            ActionKind::FindRelated => "related",
            ActionKind::Report => "report",
            ActionKind::CheckSpelling => "spell",
            ActionKind::CheckConflicts => "conflict",
        }
    }

    /// Whether generated answers for this action go through the cache
    pub fn is_cached(&self) -> bool {
        matches!(self, ActionKind::Report | ActionKind::CheckSpelling)
    }

    /// Whether the action needs supporting documents from the index
    pub fn needs_retrieval(&self) -> bool {
        !matches!(self, ActionKind::CheckSpelling)
    }

    /// Tagged query string handed to the cache manager
    pub fn cache_query(&self, query: &str) -> String {
        format!("{}:{}", self.tag(), query.trim())
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| DomainError::validation(format!("Unknown action type: {}", s)))
    }
}
