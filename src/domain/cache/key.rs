//! Cache key derivation

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of a derived key in hex characters
pub const CACHE_KEY_LEN: usize = 64;

/// Opaque fixed-length key derived from normalized input text
///
/// Inputs that differ only in surrounding whitespace or letter case map to
/// the same key. Case folding uses the locale-independent Unicode mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives a key from arbitrary input text
    pub fn derive(text: &str) -> Self {
        let normalized = normalize(text);
        let digest = Sha256::digest(normalized.as_bytes());
        Self(hex::encode(digest))
    }

    /// Wraps an already-derived key (e.g. a value read back from storage)
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Trims surrounding whitespace and lower-cases the input
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
