//! Configuration System
//!
//! Layered configuration: built-in defaults, then an optional `article-gen.toml` (or the
//! file passed with `--config`), then `ARTICLE_GEN__SECTION__KEY` environment overrides,
//! then the legacy `OPENAI_ORG`, `OPENAI_API_KEY` and `UNSPLASH_API_KEY` variables.

use crate::error::ApiError;
use crate::generation::PromptTemplates;
use crate::logging::LoggingConfig;
use crate::provider::completion::RetryPolicy;
use crate::provider::openai::DEFAULT_OPENAI_MODEL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod merge_policy;
mod sources;

pub use sources::{DEFAULT_CONFIG_FILE, ENV_PREFIX, SECRET_ENV_VARS};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleGenConfig {
    #[serde(default)]
    pub openai: OpenAIConfig,

    #[serde(default)]
    pub unsplash: UnsplashConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub prompts: PromptTemplates,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    /// Organization id sent with every request
    #[serde(default)]
    pub organization: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    /// Override the API base URL (proxies, test servers)
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_model() -> String {
    DEFAULT_OPENAI_MODEL.to_string()
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            organization: None,
            api_key: None,
            model: default_model(),
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnsplashConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Items processed at once
    #[serde(default = "default_max_concurrent_items")]
    pub max_concurrent_items: usize,

    /// Provider calls per field, continuations included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_max_concurrent_items() -> usize {
    4
}

fn default_max_attempts() -> usize {
    5
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_concurrent_items: default_max_concurrent_items(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl GenerationConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// `keyword,category` rows, header first
    #[serde(default = "default_keywords_csv")]
    pub keywords_csv: PathBuf,

    /// `category,search term` rows, header first
    #[serde(default = "default_categories_csv")]
    pub categories_csv: PathBuf,

    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    #[serde(default = "default_export_file")]
    pub export_file: String,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("db/article_completions")
}

fn default_keywords_csv() -> PathBuf {
    PathBuf::from("keywords.csv")
}

fn default_categories_csv() -> PathBuf {
    PathBuf::from("categories.csv")
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("generated")
}

fn default_export_file() -> String {
    "generated.csv".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            keywords_csv: default_keywords_csv(),
            categories_csv: default_categories_csv(),
            export_dir: default_export_dir(),
            export_file: default_export_file(),
        }
    }
}

impl PathsConfig {
    pub fn export_path(&self) -> PathBuf {
        self.export_dir.join(&self.export_file)
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required secret is absent; holds the legacy variable name
    MissingSecret(&'static str),
    Generation(String),
    Prompts(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingSecret(var) => write!(f, "No {} env found", var),
            ValidationError::Generation(msg) => write!(f, "Generation: {}", msg),
            ValidationError::Prompts(msg) => write!(f, "Prompts: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl ArticleGenConfig {
    /// Validate the entire configuration, reporting every problem found.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let secrets = [
            ("OPENAI_ORG", &self.openai.organization),
            ("OPENAI_API_KEY", &self.openai.api_key),
            ("UNSPLASH_API_KEY", &self.unsplash.api_key),
        ];
        for (var, value) in secrets {
            if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
                errors.push(ValidationError::MissingSecret(var));
            }
        }

        if self.generation.max_concurrent_items == 0 {
            errors.push(ValidationError::Generation(
                "max_concurrent_items must be at least 1".to_string(),
            ));
        }
        if self.generation.max_attempts == 0 {
            errors.push(ValidationError::Generation(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        if let Err(e) = self.prompts.validate() {
            errors.push(ValidationError::Prompts(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold every problem into one [`ApiError::ConfigError`].
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }
}

/// Builds an [`ArticleGenConfig`] from every source.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from defaults, the config file and the environment. Does not validate.
    pub fn load(config_path: Option<&Path>) -> Result<ArticleGenConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = sources::add_file(builder, config_path);
        let builder = sources::add_environment(builder)?;
        let config = builder.build()?.try_deserialize::<ArticleGenConfig>()?;
        Ok(config)
    }

    /// Load a single TOML file over the defaults, ignoring the environment.
    pub fn load_from_file(path: &Path) -> Result<ArticleGenConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let config = sources::add_file(builder, Some(path))
            .build()?
            .try_deserialize::<ArticleGenConfig>()?;
        Ok(config)
    }
}
