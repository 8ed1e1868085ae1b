//! Two-tier cache over a real SQLite file

use std::sync::Arc;

use handbook_rag::domain::cache::{CacheKey, ResponseStore};
use handbook_rag::infrastructure::cache::{
    CacheManager, ClearOutcome, HitSource, SqliteResponseStore, SqliteStoreConfig,
};
use tempfile::TempDir;

async fn open_manager(dir: &TempDir, capacity: usize) -> (Arc<SqliteResponseStore>, CacheManager) {
    let config = SqliteStoreConfig::new(dir.path().join("cache.db"));
    let store = Arc::new(SqliteResponseStore::try_open(&config).await.unwrap());
    let manager = CacheManager::new(store.clone(), capacity);
    (store, manager)
}

#[tokio::test]
async fn answers_survive_restart() {
    let dir = TempDir::new().unwrap();

    {
        let (_, manager) = open_manager(&dir, 10).await;
        manager.set("report:budget 2024", "Budget summary").await;
    }

    let (_, manager) = open_manager(&dir, 10).await;
    let hit = manager.lookup("  REPORT:Budget 2024 ").await.unwrap();

    assert_eq!(hit.value, "Budget summary");
    assert_eq!(hit.source, HitSource::Persistent);

    let again = manager.lookup("report:budget 2024").await.unwrap();
    assert_eq!(again.source, HitSource::Memory);
}

#[tokio::test]
async fn evicted_entries_remain_persistent() {
    let dir = TempDir::new().unwrap();
    let (store, manager) = open_manager(&dir, 2).await;

    manager.set("a", "1").await;
    manager.set("b", "2").await;
    manager.set("c", "3").await;

    assert!(!manager.in_memory("a"));
    assert_eq!(store.get(&CacheKey::derive("a")).await.unwrap().as_deref(), Some("1"));
    assert_eq!(manager.get("a").await.as_deref(), Some("1"));
    assert_eq!(manager.stats().persistent_hits, 1);
}

#[tokio::test]
async fn clear_empties_both_tiers() {
    let dir = TempDir::new().unwrap();
    let (store, manager) = open_manager(&dir, 10).await;
    manager.set("a", "1").await;
    manager.set("b", "2").await;

    let outcome = manager.clear().await;

    assert_eq!(outcome, ClearOutcome::Complete { persistent_rows: 2 });
    assert!(manager.get("a").await.is_none());
    assert!(manager.get("b").await.is_none());
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn unusable_database_degrades_to_memory() {
    let dir = TempDir::new().unwrap();
    let config = SqliteStoreConfig::new(dir.path().join("missing").join("cache.db"));
    let store = Arc::new(SqliteResponseStore::open(&config).await);
    assert!(!store.is_attached());

    let manager = CacheManager::new(store, 10);
    manager.set("q", "answer").await;

    assert_eq!(manager.get("q").await.as_deref(), Some("answer"));
    assert_eq!(manager.clear().await, ClearOutcome::MemoryOnly);
}
