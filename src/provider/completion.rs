//! Retrying completion service
//!
//! Long-form output is truncated by the provider's token budget, so the service asks the
//! model to finish with an end marker and keeps continuing from the extended prompt until
//! the marker shows up (or the model returns nothing). Transport failures consume an
//! attempt and are retried after a delay.

use crate::error::ApiError;
use crate::provider::{CompletionProvider, CompletionRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Sentinel the model is asked to terminate its output with.
pub const END_MARKER: &str = "<end>";

pub const DEFAULT_MAX_ATTEMPTS: usize = 5;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Sampling options for one logical completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    pub presence_penalty: f32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.2,
            presence_penalty: 0.0,
        }
    }
}

impl CompletionOptions {
    pub fn with_max_tokens(max_tokens: u32) -> Self {
        Self {
            max_tokens,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total provider calls allowed, continuations included
    pub max_attempts: usize,
    /// Pause after a failed call
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Wraps a [`CompletionProvider`] with the end-marker continuation loop.
pub struct CompletionService {
    provider: Arc<dyn CompletionProvider>,
    policy: RetryPolicy,
}

impl CompletionService {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self::with_policy(provider, RetryPolicy::default())
    }

    pub fn with_policy(provider: Arc<dyn CompletionProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    /// Generate text for `prompt`.
    ///
    /// The result joins the chunks of every continuation, not only the last one, with the
    /// end marker removed and surrounding whitespace trimmed. Fails with
    /// [`ApiError::CompletionExhausted`] when the attempt budget runs out before the marker
    /// is seen.
    pub async fn generate_completion(
        &self,
        prompt: &str,
        options: CompletionOptions,
    ) -> Result<String, ApiError> {
        let mut accumulated_prompt = wrap_prompt(prompt);
        let mut generated = String::new();
        let mut last_error: Option<String> = None;

        for attempt in 1..=self.policy.max_attempts {
            let request = CompletionRequest {
                prompt: accumulated_prompt.clone(),
                max_tokens: options.max_tokens,
                temperature: options.temperature,
                presence_penalty: options.presence_penalty,
            };

            match self.provider.complete(&request).await {
                Ok(text) => {
                    accumulated_prompt.push_str(&text);
                    generated.push_str(&text);

                    if text.is_empty() || text.contains(END_MARKER) {
                        debug!(
                            provider = self.provider.provider_name(),
                            attempt,
                            chars = generated.len(),
                            "Completion finished"
                        );
                        return Ok(strip_end_marker(&generated));
                    }

                    debug!(
                        provider = self.provider.provider_name(),
                        attempt, "No end marker yet, continuing generation"
                    );
                }
                Err(err) => {
                    warn!(
                        provider = self.provider.provider_name(),
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        error = %err,
                        "Completion attempt failed"
                    );
                    last_error = Some(err.to_string());
                    if attempt < self.policy.max_attempts && !self.policy.retry_delay.is_zero() {
                        sleep(self.policy.retry_delay).await;
                    }
                }
            }
        }

        Err(ApiError::CompletionExhausted {
            attempts: self.policy.max_attempts,
            last_error,
        })
    }
}

/// Instruct the model to terminate its output with [`END_MARKER`].
pub fn wrap_prompt(prompt: &str) -> String {
    format!("{}. End string with {}.\n\ntexto:\n", prompt, END_MARKER)
}

/// Remove every end marker and trim surrounding whitespace.
pub fn strip_end_marker(text: &str) -> String {
    text.replace(END_MARKER, "").trim().to_string()
}
