use thiserror::Error;

/// Failures of the persistent cache tier
///
/// The cache manager absorbs all of these; they never reach a caller of the
/// pipeline.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("persistent store is unavailable")]
    Unavailable,

    #[error("failed to connect to persistent store: {0}")]
    Connection(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("transaction failed: {0}")]
    Transaction(String),
}

impl StorageError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query(message.into())
    }

    pub fn transaction(message: impl Into<String>) -> Self {
        Self::Transaction(message.into())
    }
}
