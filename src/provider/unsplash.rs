//! Unsplash image search client (`/photos/random`).

use crate::error::ApiError;
use crate::provider::{
    build_provider_http_client, map_http_error, ImageResult, ImageSearchClient,
    ImageSearchRequest,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_UNSPLASH_BASE_URL: &str = "https://api.unsplash.com";

#[derive(Deserialize)]
struct Photo {
    urls: PhotoUrls,
    user: PhotoUser,
}

#[derive(Deserialize)]
struct PhotoUrls {
    regular: String,
}

#[derive(Deserialize)]
struct PhotoUser {
    username: String,
}

/// Parse a `/photos/random?count=N` body (a JSON array of photos).
pub(crate) fn parse_photos_body(body: &str) -> Result<Vec<ImageResult>, ApiError> {
    let photos: Option<Vec<Photo>> = serde_json::from_str(body)
        .map_err(|e| ApiError::ImageSearchFailed(format!("Failed to parse response: {}", e)))?;

    Ok(photos
        .unwrap_or_default()
        .into_iter()
        .map(|photo| ImageResult {
            image_url: photo.urls.regular,
            username: photo.user.username,
        })
        .collect())
}

/// Unsplash provider client
pub struct UnsplashClient {
    client: Client,
    access_key: String,
    base_url: String,
}

impl UnsplashClient {
    pub fn new(access_key: String, base_url: Option<String>) -> Result<Self, ApiError> {
        let client = build_provider_http_client()?;
        let base_url = base_url.unwrap_or_else(|| DEFAULT_UNSPLASH_BASE_URL.to_string());
        Ok(Self {
            client,
            access_key,
            base_url,
        })
    }
}

#[async_trait]
impl ImageSearchClient for UnsplashClient {
    async fn search(&self, request: &ImageSearchRequest) -> Result<Vec<ImageResult>, ApiError> {
        let url = format!("{}/photos/random", self.base_url.trim_end_matches('/'));
        let count = request.count.to_string();
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .query(&[("query", request.query.as_str()), ("count", count.as_str())])
            .send()
            .await
            .map_err(map_http_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::ImageSearchStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::ImageSearchFailed(format!("Failed to read response: {}", e)))?;
        parse_photos_body(&body)
    }

    fn provider_name(&self) -> &str {
        "unsplash"
    }
}
