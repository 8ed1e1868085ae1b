//! Cache domain - key derivation, entries and the persistent store contract

mod entry;
mod error;
mod key;
mod repository;

pub use entry::CacheEntry;
pub use error::StorageError;
pub use key::{normalize, CacheKey, CACHE_KEY_LEN};
pub use repository::ResponseStore;

#[cfg(test)]
pub use repository::mock::MockResponseStore;
