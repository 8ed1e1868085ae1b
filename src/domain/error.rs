use thiserror::Error;

use super::cache::StorageError;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Retrieval error: {message}")]
    Retrieval { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("Query must not be empty");
        assert_eq!(error.to_string(), "Validation error: Query must not be empty");
    }

    #[test]
    fn test_provider_error() {
        let error = DomainError::provider("ollama", "connection refused");
        assert_eq!(
            error.to_string(),
            "Provider error: ollama - connection refused"
        );
    }

    #[test]
    fn test_storage_error_conversion() {
        let error: DomainError = StorageError::Unavailable.into();
        assert!(matches!(error, DomainError::Storage(StorageError::Unavailable)));
        assert!(error.to_string().starts_with("Storage error:"));
    }
}
