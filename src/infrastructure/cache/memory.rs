//! Bounded in-memory LRU tier

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

use lru::LruCache;
use tracing::warn;

use crate::domain::cache::CacheKey;

/// Recency-ordered cache of recent answers
///
/// Reads refresh recency; inserting into a full tier evicts the least
/// recently used entry. None of the operations can fail.
#[derive(Debug)]
pub struct MemoryTier {
    entries: Mutex<LruCache<CacheKey, String>>,
    capacity: NonZeroUsize,
}

impl MemoryTier {
    /// Creates a tier holding at most `capacity` entries (zero is treated as one)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            capacity,
        }
    }

    fn lock(&self, op: &'static str) -> MutexGuard<'_, LruCache<CacheKey, String>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!(
                    op,
                    result = "poisoned_recovered",
                    "Recovered from poisoned memory tier lock"
                );
                poisoned.into_inner()
            }
        }
    }

    /// Gets a value and marks it most recently used
    pub fn get(&self, key: &CacheKey) -> Option<String> {
        self.lock("get").get(key).cloned()
    }

    /// Inserts or replaces a value, evicting the oldest entry when full
    pub fn put(&self, key: CacheKey, value: String) {
        self.lock("put").put(key, value);
    }

    /// Inserts `value` unless the key is already present, returning the value
    /// the tier holds afterwards
    pub fn put_if_absent(&self, key: CacheKey, value: String) -> String {
        self.lock("put_if_absent")
            .get_or_insert(key, || value)
            .clone()
    }

    /// Checks presence without touching recency
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock("contains").contains(key)
    }

    pub fn clear(&self) {
        self.lock("clear").clear();
    }

    pub fn len(&self) -> usize {
        self.lock("len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(text: &str) -> CacheKey {
        CacheKey::derive(text)
    }

    #[test]
    fn test_put_and_get() {
        let tier = MemoryTier::new(10);
        tier.put(key("a"), "alpha".to_string());

        assert_eq!(tier.get(&key("a")), Some("alpha".to_string()));
        assert_eq!(tier.get(&key("b")), None);
        assert_eq!(tier.len(), 1);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let tier = MemoryTier::new(2);
        tier.put(key("a"), "1".to_string());
        tier.put(key("b"), "2".to_string());
        tier.put(key("c"), "3".to_string());

        assert!(!tier.contains(&key("a")));
        assert!(tier.contains(&key("b")));
        assert!(tier.contains(&key("c")));
        assert_eq!(tier.len(), 2);
    }

    #[test]
    fn test_get_refreshes_recency() {
        let tier = MemoryTier::new(2);
        tier.put(key("a"), "1".to_string());
        tier.put(key("b"), "2".to_string());

        assert!(tier.get(&key("a")).is_some());
        tier.put(key("c"), "3".to_string());

        assert!(tier.contains(&key("a")));
        assert!(!tier.contains(&key("b")));
    }

    #[test]
    fn test_contains_does_not_refresh_recency() {
        let tier = MemoryTier::new(2);
        tier.put(key("a"), "1".to_string());
        tier.put(key("b"), "2".to_string());

        assert!(tier.contains(&key("a")));
        tier.put(key("c"), "3".to_string());

        assert!(!tier.contains(&key("a")));
    }

    #[test]
    fn test_put_if_absent_keeps_existing_value() {
        let tier = MemoryTier::new(4);
        tier.put(key("a"), "new".to_string());

        let held = tier.put_if_absent(key("a"), "old".to_string());

        assert_eq!(held, "new");
        assert_eq!(tier.get(&key("a")), Some("new".to_string()));
        assert_eq!(tier.put_if_absent(key("b"), "fresh".to_string()), "fresh");
        assert_eq!(tier.len(), 2);
    }

    #[test]
    fn test_overwrite_keeps_single_entry() {
        let tier = MemoryTier::new(4);
        tier.put(key("a"), "old".to_string());
        tier.put(key("a"), "new".to_string());

        assert_eq!(tier.len(), 1);
        assert_eq!(tier.get(&key("a")), Some("new".to_string()));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let tier = MemoryTier::new(0);
        tier.put(key("a"), "1".to_string());

        assert_eq!(tier.capacity(), 1);
        assert_eq!(tier.len(), 1);
    }

    #[test]
    fn test_clear() {
        let tier = MemoryTier::new(4);
        tier.put(key("a"), "1".to_string());
        tier.put(key("b"), "2".to_string());
        tier.clear();

        assert!(tier.is_empty());
    }
}
