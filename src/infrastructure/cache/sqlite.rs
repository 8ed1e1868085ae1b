//! SQLite-backed persistent response store

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tracing::{debug, error, info};

use crate::domain::cache::{CacheEntry, CacheKey, ResponseStore, StorageError};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS llm_cache (
        query_hash TEXT PRIMARY KEY,
        query_text TEXT NOT NULL,
        response   TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
"#;

/// SQLite store configuration
#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    /// Database file, created on first use
    pub path: PathBuf,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Connection acquire timeout in seconds
    pub acquire_timeout_secs: u64,
}

impl Default for SqliteStoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("cache.db"),
            max_connections: 4,
            acquire_timeout_secs: 5,
        }
    }
}

impl SqliteStoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }
}

/// Persistent tier over a single `llm_cache` table
///
/// A store that failed to open stays detached and answers every call with
/// [`StorageError::Unavailable`].
pub struct SqliteResponseStore {
    pool: Option<SqlitePool>,
    path: PathBuf,
}

impl Debug for SqliteResponseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteResponseStore")
            .field("path", &self.path)
            .field("attached", &self.pool.is_some())
            .finish()
    }
}

impl SqliteResponseStore {
    /// Opens the store, running detached if the database cannot be prepared
    pub async fn open(config: &SqliteStoreConfig) -> Self {
        match Self::try_open(config).await {
            Ok(store) => store,
            Err(e) => {
                error!(
                    path = %config.path.display(),
                    error = %e,
                    "Persistent cache unavailable, continuing with memory tier only"
                );
                Self::detached(&config.path)
            }
        }
    }

    /// Opens the store and creates the schema, reporting any failure
    pub async fn try_open(config: &SqliteStoreConfig) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await
            .map_err(|e| StorageError::connection(e.to_string()))?;

        let store = Self {
            pool: Some(pool),
            path: config.path.clone(),
        };
        store.ensure_table().await?;

        info!(path = %config.path.display(), "Persistent cache initialized");
        Ok(store)
    }

    /// A store with no database behind it
    pub fn detached(path: impl AsRef<Path>) -> Self {
        Self {
            pool: None,
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.pool.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn pool(&self) -> Result<&SqlitePool, StorageError> {
        self.pool.as_ref().ok_or(StorageError::Unavailable)
    }

    async fn ensure_table(&self) -> Result<(), StorageError> {
        sqlx::query(CREATE_TABLE)
            .execute(self.pool()?)
            .await
            .map_err(|e| StorageError::query(format!("Failed to create cache table: {}", e)))?;

        Ok(())
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[async_trait]
impl ResponseStore for SqliteResponseStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT response FROM llm_cache WHERE query_hash = ?")
            .bind(key.as_str())
            .fetch_optional(self.pool()?)
            .await
            .map_err(|e| StorageError::query(e.to_string()))?;

        row.map(|r| r.try_get::<String, _>("response"))
            .transpose()
            .map_err(|e| StorageError::query(e.to_string()))
    }

    async fn put(
        &self,
        key: &CacheKey,
        query_text: &str,
        response: &str,
    ) -> Result<(), StorageError> {
        let mut tx = self
            .pool()?
            .begin()
            .await
            .map_err(|e| StorageError::transaction(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO llm_cache (query_hash, query_text, response, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (query_hash) DO UPDATE SET
                query_text = excluded.query_text,
                response = excluded.response,
                created_at = excluded.created_at
            "#,
        )
        .bind(key.as_str())
        .bind(query_text)
        .bind(response)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| StorageError::transaction(e.to_string()))?;

        debug!(key = %key, "Stored answer in persistent cache");
        Ok(())
    }

    async fn clear_all(&self) -> Result<u64, StorageError> {
        let mut tx = self
            .pool()?
            .begin()
            .await
            .map_err(|e| StorageError::transaction(e.to_string()))?;

        let result = sqlx::query("DELETE FROM llm_cache")
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| StorageError::transaction(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn entry(&self, key: &CacheKey) -> Result<Option<CacheEntry>, StorageError> {
        let row = sqlx::query(
            "SELECT query_hash, query_text, response, created_at FROM llm_cache WHERE query_hash = ?",
        )
        .bind(key.as_str())
        .fetch_optional(self.pool()?)
        .await
        .map_err(|e| StorageError::query(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let hash: String = row
            .try_get("query_hash")
            .map_err(|e| StorageError::query(e.to_string()))?;
        let query_text: String = row
            .try_get("query_text")
            .map_err(|e| StorageError::query(e.to_string()))?;
        let response: String = row
            .try_get("response")
            .map_err(|e| StorageError::query(e.to_string()))?;
        let created_at: String = row
            .try_get("created_at")
            .map_err(|e| StorageError::query(e.to_string()))?;

        Ok(Some(
            CacheEntry::new(CacheKey::from_raw(hash), query_text, response)
                .with_created_at(parse_timestamp(&created_at)),
        ))
    }

    async fn count(&self) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM llm_cache")
            .fetch_one(self.pool()?)
            .await
            .map_err(|e| StorageError::query(e.to_string()))?;

        Ok(count.max(0) as u64)
    }
}
