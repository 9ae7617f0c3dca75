//! Remote Provider Abstraction
//!
//! Interfaces for the two remote services the pipeline consumes: a text-completion
//! provider and an image-search provider. Concrete HTTP clients live in the submodules;
//! [`completion::CompletionService`] adds retry and continuation on top of any
//! [`CompletionProvider`].

use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod completion;
pub mod openai;
pub mod unsplash;

pub use completion::CompletionService;
pub use openai::OpenAIClient;
pub use unsplash::UnsplashClient;

/// A single text-completion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub presence_penalty: f32,
}

/// Text-completion provider client trait
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Complete `request.prompt`, returning the generated text only.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ApiError>;

    /// Get the provider name
    fn provider_name(&self) -> &str;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// An image search query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSearchRequest {
    pub query: String,
    pub count: u32,
}

/// One image returned by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResult {
    pub image_url: String,
    pub username: String,
}

/// Image search client trait
#[async_trait]
pub trait ImageSearchClient: Send + Sync {
    /// Search for images. A non-success HTTP status is reported as
    /// [`ApiError::ImageSearchStatus`].
    async fn search(&self, request: &ImageSearchRequest) -> Result<Vec<ImageResult>, ApiError>;

    fn provider_name(&self) -> &str;
}

// Helper function to map HTTP errors to ApiError
pub(crate) fn map_http_error(error: reqwest::Error) -> ApiError {
    if let Some(status) = error.status() {
        match status.as_u16() {
            401 => ApiError::ProviderAuthFailed(format!("Authentication failed: {}", error)),
            429 => ApiError::ProviderRateLimit(format!("Rate limit exceeded: {}", error)),
            _ => ApiError::ProviderRequestFailed(format!(
                "Request failed with status {}: {}",
                status, error
            )),
        }
    } else if error.is_timeout() {
        ApiError::ProviderRequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ApiError::ProviderRequestFailed(format!("Connection error: {}", error))
    } else {
        ApiError::ProviderError(format!("HTTP error: {}", error))
    }
}

/// Map a non-success status and its body text to an ApiError
pub(crate) fn map_status_error(status: reqwest::StatusCode, error_text: String) -> ApiError {
    match status.as_u16() {
        401 => ApiError::ProviderAuthFailed(format!("Authentication failed: {}", error_text)),
        429 => ApiError::ProviderRateLimit(format!("Rate limit exceeded: {}", error_text)),
        _ => ApiError::ProviderRequestFailed(format!(
            "Request failed with status {}: {}",
            status, error_text
        )),
    }
}

const PROVIDER_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const PROVIDER_HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub(crate) fn build_provider_http_client() -> Result<Client, ApiError> {
    Client::builder()
        .connect_timeout(PROVIDER_HTTP_CONNECT_TIMEOUT)
        .timeout(PROVIDER_HTTP_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ApiError::ProviderError(format!("Failed to create HTTP client: {}", e)))
}
