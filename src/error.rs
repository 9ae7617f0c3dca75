//! Error types for the article generation pipeline.

use thiserror::Error;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Record already exists for key: {0}")]
    DuplicateKey(String),

    #[error("Record not found for key: {0}")]
    RecordNotFound(String),

    #[error("Record for key {record_key} cannot be stored under key {key}")]
    KeyMismatch { key: String, record_key: String },

    #[error("Failed to encode record {key}: {message}")]
    Encode { key: String, message: String },

    #[error("Failed to decode record {key}: {message}")]
    Decode { key: String, message: String },

    #[error("Storage backend error: {0}")]
    Backend(#[from] sled::Error),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors surfaced by providers, configuration and the CLI surface.
///
/// Field generators never let these escape: they are folded into
/// [`crate::model::CompletionError`] values at the generator boundary.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    ProviderRateLimit(String),

    #[error("Completion did not finish after {attempts} attempts{}", last_error_suffix(.last_error))]
    CompletionExhausted {
        attempts: usize,
        last_error: Option<String>,
    },

    #[error("Image search returned status {0}")]
    ImageSearchStatus(u16),

    #[error("Image search failed: {0}")]
    ImageSearchFailed(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV error: {0}")]
    CsvError(String),

    #[error("Failed to render output: {0}")]
    RenderError(String),
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    match last_error {
        Some(e) => format!(" (last error: {})", e),
        None => String::new(),
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::StorageError(err.to_string())
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<csv::Error> for ApiError {
    fn from(err: csv::Error) -> Self {
        ApiError::CsvError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_error_mentions_last_failure() {
        let err = ApiError::CompletionExhausted {
            attempts: 5,
            last_error: Some("timeout".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Completion did not finish after 5 attempts (last error: timeout)"
        );

        let err = ApiError::CompletionExhausted {
            attempts: 5,
            last_error: None,
        };
        assert_eq!(err.to_string(), "Completion did not finish after 5 attempts");
    }

    #[test]
    fn key_mismatch_names_both_keys() {
        let err = StorageError::KeyMismatch {
            key: "a".to_string(),
            record_key: "b".to_string(),
        };
        assert_eq!(err.to_string(), "Record for key b cannot be stored under key a");
    }

    #[test]
    fn render_error_is_reported_as_output_failure() {
        let err = ApiError::RenderError("status: bad value".to_string());
        assert_eq!(err.to_string(), "Failed to render output: status: bad value");
    }

    #[test]
    fn storage_error_converts_to_api_error() {
        let err: ApiError = StorageError::DuplicateKey("petanque".to_string()).into();
        assert!(matches!(err, ApiError::StorageError(ref msg) if msg.contains("petanque")));
    }
}
