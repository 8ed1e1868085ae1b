//! Cache infrastructure - memory tier, SQLite store and the tier manager

mod manager;
mod memory;
mod sqlite;

pub use manager::{CacheHit, CacheManager, CacheStats, ClearOutcome, HitSource};
pub use memory::MemoryTier;
pub use sqlite::{SqliteResponseStore, SqliteStoreConfig};
