//! Shared test utilities for integration tests
//!
//! Mock providers with switchable failures, plus a generator wired to a temporary store.

use article_gen::error::ApiError;
use article_gen::generation::{ArticleGenerator, PromptTemplates};
use article_gen::model::CategoryMap;
use article_gen::provider::completion::RetryPolicy;
use article_gen::provider::{
    CompletionProvider, CompletionRequest, CompletionService, ImageResult, ImageSearchClient,
    ImageSearchRequest,
};
use article_gen::store::SledCompletionStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Completion provider that fails any prompt containing a registered marker.
pub struct MockCompletions {
    failing: Mutex<Vec<String>>,
    pub calls: AtomicUsize,
}

impl MockCompletions {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            failing: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn fail_on(&self, marker: &str) {
        self.failing.lock().push(marker.to_string());
    }

    pub fn heal(&self) {
        self.failing.lock().clear();
    }
}

#[async_trait]
impl CompletionProvider for MockCompletions {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failing = self.failing.lock().clone();
        if failing.iter().any(|m| request.prompt.contains(m.as_str())) {
            return Err(ApiError::ProviderRequestFailed("connection reset".to_string()));
        }
        Ok(format!("Titular\r\nTexto de {} tokens <end>", request.max_tokens))
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Image search that either returns one photo per query or a 403.
pub struct MockImages {
    pub failing: AtomicBool,
}

impl MockImages {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            failing: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl ImageSearchClient for MockImages {
    async fn search(&self, request: &ImageSearchRequest) -> Result<Vec<ImageResult>, ApiError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ApiError::ImageSearchStatus(403));
        }
        Ok(vec![ImageResult {
            image_url: format!("https://images.test/{}", request.query.replace(' ', "-")),
            username: "fotografo".to_string(),
        }])
    }

    fn provider_name(&self) -> &str {
        "mock-images"
    }
}

pub fn templates() -> PromptTemplates {
    PromptTemplates {
        title: "{keyword}".to_string(),
        content: "CONTENT about {keyword}".to_string(),
        meta_desc: "META_DESC about {keyword}".to_string(),
        meta_title: "META_TITLE about {keyword}".to_string(),
    }
}

pub fn categories() -> CategoryMap {
    let mut map = CategoryMap::new();
    map.insert("equipment".to_string(), "petanque balls".to_string());
    map.insert("rules".to_string(), "petanque game".to_string());
    map
}

pub fn build_generator(
    completions: Arc<MockCompletions>,
    images: Arc<MockImages>,
    store: Arc<SledCompletionStore>,
) -> ArticleGenerator {
    let service = CompletionService::with_policy(
        completions,
        RetryPolicy {
            max_attempts: 3,
            retry_delay: Duration::ZERO,
        },
    );
    ArticleGenerator::new(
        Arc::new(service),
        images,
        store,
        Arc::new(categories()),
        templates(),
    )
}
