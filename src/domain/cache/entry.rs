//! Persisted cache entry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CacheKey;

/// A cached answer as stored by the persistent tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub query_text: String,
    pub response_text: String,
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(
        key: CacheKey,
        query_text: impl Into<String>,
        response_text: impl Into<String>,
    ) -> Self {
        Self {
            key,
            query_text: query_text.into(),
            response_text: response_text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}
