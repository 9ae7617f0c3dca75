//! OpenAI text-completion client (legacy `/completions` endpoint).

use crate::error::ApiError;
use crate::provider::{
    build_provider_http_client, map_http_error, map_status_error, CompletionProvider,
    CompletionRequest,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo-instruct";

#[derive(Serialize)]
struct TextCompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    presence_penalty: f32,
}

#[derive(Deserialize)]
struct TextCompletionResponse {
    choices: Vec<TextChoice>,
}

#[derive(Deserialize)]
struct TextChoice {
    text: String,
}

/// Extract the generated text from a `/completions` response body.
pub(crate) fn parse_completion_body(body: &str) -> Result<String, ApiError> {
    let completion: TextCompletionResponse = serde_json::from_str(body)
        .map_err(|e| ApiError::ProviderError(format!("Failed to parse response: {}", e)))?;
    completion
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.text)
        .ok_or_else(|| ApiError::ProviderError("No choices in response".to_string()))
}

/// OpenAI provider client
pub struct OpenAIClient {
    client: Client,
    model: String,
    api_key: String,
    organization: String,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(
        model: String,
        api_key: String,
        organization: String,
        base_url: Option<String>,
    ) -> Result<Self, ApiError> {
        let client = build_provider_http_client()?;
        let base_url = base_url.unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

        Ok(Self {
            client,
            model,
            api_key,
            organization,
            base_url,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAIClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ApiError> {
        let body = TextCompletionRequest {
            model: &self.model,
            prompt: &request.prompt,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            presence_penalty: request.presence_penalty,
        };

        let url = format!("{}/completions", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("OpenAI-Organization", &self.organization)
            .json(&body)
            .send()
            .await
            .map_err(map_http_error)?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::ProviderError(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(map_status_error(status, text));
        }

        parse_completion_body(&text)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
