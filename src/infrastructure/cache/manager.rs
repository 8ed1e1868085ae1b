//! Two-tier cache manager
//!
//! Composes the in-memory LRU tier over the persistent store. Lookups go to
//! memory first and promote persistent hits; writes go to both tiers. Storage
//! failures are logged and absorbed so the cache never fails a request.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use super::MemoryTier;
use crate::domain::cache::{CacheKey, ResponseStore};

/// Tier that served a cache hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HitSource {
    Memory,
    Persistent,
}

/// A cached answer and the tier it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheHit {
    pub value: String,
    pub source: HitSource,
}

/// Result of a full clear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClearOutcome {
    /// Both tiers emptied
    Complete { persistent_rows: u64 },
    /// Memory emptied; the persistent delete failed
    MemoryOnly,
}

/// Counters describing cache behaviour since startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub memory_hits: u64,
    pub persistent_hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub write_failures: u64,
    pub memory_entries: usize,
    pub memory_capacity: usize,
}

#[derive(Debug, Default)]
struct Counters {
    memory_hits: AtomicU64,
    persistent_hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    write_failures: AtomicU64,
}

/// Memory tier over a persistent store
#[derive(Debug)]
pub struct CacheManager {
    memory: MemoryTier,
    store: Arc<dyn ResponseStore>,
    // Shared by get/set, held exclusively by clear
    gate: RwLock<()>,
    counters: Counters,
}

impl CacheManager {
    pub fn new(store: Arc<dyn ResponseStore>, memory_capacity: usize) -> Self {
        Self {
            memory: MemoryTier::new(memory_capacity),
            store,
            gate: RwLock::new(()),
            counters: Counters::default(),
        }
    }

    /// Gets a cached answer for `query`
    pub async fn get(&self, query: &str) -> Option<String> {
        self.lookup(query).await.map(|hit| hit.value)
    }

    /// Gets a cached answer together with the tier that served it
    pub async fn lookup(&self, query: &str) -> Option<CacheHit> {
        let key = CacheKey::derive(query);
        let _gate = self.gate.read().await;

        if let Some(value) = self.memory.get(&key) {
            debug!(key = %key, "Memory cache hit");
            self.counters.memory_hits.fetch_add(1, Ordering::Relaxed);
            counter!("cache_lookups_total", "result" => "memory_hit").increment(1);
            return Some(CacheHit {
                value,
                source: HitSource::Memory,
            });
        }

        match self.store.get(&key).await {
            Ok(Some(value)) => {
                debug!(key = %key, "Persistent cache hit, promoting to memory");
                // A set that landed during the read wins over the older row
                let value = self.memory.put_if_absent(key, value);
                self.counters.persistent_hits.fetch_add(1, Ordering::Relaxed);
                counter!("cache_lookups_total", "result" => "persistent_hit").increment(1);
                Some(CacheHit {
                    value,
                    source: HitSource::Persistent,
                })
            }
            Ok(None) => {
                self.record_miss();
                None
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Persistent cache read failed, treating as miss");
                self.record_miss();
                None
            }
        }
    }

    fn record_miss(&self) {
        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        counter!("cache_lookups_total", "result" => "miss").increment(1);
    }

    /// Stores an answer in both tiers
    pub async fn set(&self, query: &str, response: &str) {
        let key = CacheKey::derive(query);
        let _gate = self.gate.read().await;

        self.memory.put(key.clone(), response.to_string());
        self.counters.writes.fetch_add(1, Ordering::Relaxed);

        if let Err(e) = self.store.put(&key, query, response).await {
            warn!(key = %key, error = %e, "Persistent cache write failed, kept in memory only");
            self.counters.write_failures.fetch_add(1, Ordering::Relaxed);
            counter!("cache_write_failures_total").increment(1);
        }
    }

    /// Empties both tiers
    pub async fn clear(&self) -> ClearOutcome {
        let _gate = self.gate.write().await;

        self.memory.clear();

        match self.store.clear_all().await {
            Ok(rows) => {
                warn!(persistent_rows = rows, "Cache cleared");
                ClearOutcome::Complete {
                    persistent_rows: rows,
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to clear persistent cache; memory tier cleared");
                ClearOutcome::MemoryOnly
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            memory_hits: self.counters.memory_hits.load(Ordering::Relaxed),
            persistent_hits: self.counters.persistent_hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            writes: self.counters.writes.load(Ordering::Relaxed),
            write_failures: self.counters.write_failures.load(Ordering::Relaxed),
            memory_entries: self.memory.len(),
            memory_capacity: self.memory.capacity(),
        }
    }

    /// Whether a query is currently held by the memory tier
    pub fn in_memory(&self, query: &str) -> bool {
        self.memory.contains(&CacheKey::derive(query))
    }

    pub fn store(&self) -> &Arc<dyn ResponseStore> {
        &self.store
    }
}
