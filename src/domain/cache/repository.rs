//! Persistent response store trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use super::{CacheEntry, CacheKey, StorageError};

/// Durable key -> answer table that survives process restarts
///
/// Implementations must keep writes transactional: a reader never observes a
/// half-written row. Every failure is reported as a [`StorageError`] and it is
/// up to the caller to decide how to degrade.
#[async_trait]
pub trait ResponseStore: Send + Sync + Debug {
    /// Gets the stored answer for a key
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, StorageError>;

    /// Inserts or replaces the answer for a key
    async fn put(
        &self,
        key: &CacheKey,
        query_text: &str,
        response: &str,
    ) -> Result<(), StorageError>;

    /// Deletes every row, returning how many were removed
    async fn clear_all(&self) -> Result<u64, StorageError>;

    /// Gets the full entry for a key, including its query text and timestamp
    async fn entry(&self, key: &CacheKey) -> Result<Option<CacheEntry>, StorageError>;

    /// Returns the number of stored rows
    async fn count(&self) -> Result<u64, StorageError>;
}
