//! CLI route: single route table and run context. Dispatches to library services and
//! presentation.

use crate::cli::parse::Commands;
use crate::cli::presentation::{format_generation_report, format_status_json, format_status_text};
use crate::config::{ArticleGenConfig, ConfigLoader};
use crate::error::ApiError;
use crate::export::export_succeeded;
use crate::generation::ArticleGenerator;
use crate::loaders::{load_category_map, load_inputs};
use crate::provider::{CompletionService, OpenAIClient, UnsplashClient};
use crate::store::{CompletionStore, SledCompletionStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Runtime context for CLI execution: loaded configuration and the opened store.
pub struct RunContext {
    config: ArticleGenConfig,
    store: Arc<SledCompletionStore>,
}

impl RunContext {
    /// Load configuration (defaults, file, environment) and open the store.
    ///
    /// Secrets are checked only by the commands that call remote services.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = ConfigLoader::load(config_path.as_deref())?;
        Self::with_config(config)
    }

    pub fn with_config(config: ArticleGenConfig) -> Result<Self, ApiError> {
        let store = Arc::new(SledCompletionStore::new(&config.paths.store_path)?);
        info!(store_path = %config.paths.store_path.display(), "Store opened");
        Ok(Self { config, store })
    }

    pub fn config(&self) -> &ArticleGenConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Generate {
                keywords,
                categories,
                concurrency,
            } => {
                let keywords = keywords.as_deref().unwrap_or(&self.config.paths.keywords_csv);
                let inputs = load_inputs(keywords)?;
                let generator = self.build_generator(categories.as_deref(), *concurrency)?;
                let report = block_on(generator.start_generation(inputs))?;
                self.store.flush()?;
                Ok(format_generation_report("Generation", &report))
            }
            Commands::Regenerate {
                categories,
                concurrency,
            } => {
                let generator = self.build_generator(categories.as_deref(), *concurrency)?;
                let report = block_on(generator.regenerate_articles())??;
                self.store.flush()?;
                Ok(format_generation_report("Regeneration", &report))
            }
            Commands::Export { output } => {
                let path = output
                    .clone()
                    .unwrap_or_else(|| self.config.paths.export_path());
                let count = export_succeeded(self.store.as_ref(), &path)?;
                Ok(format!("Exported {} records to {}", count, path.display()))
            }
            Commands::Status { format } => {
                let succeeded = self.store.find_succeeded()?.len();
                let failed = self.store.find_failed()?;
                if format == "json" {
                    format_status_json(succeeded, &failed)
                } else {
                    Ok(format_status_text(succeeded, &failed))
                }
            }
        }
    }

    fn build_generator(
        &self,
        categories_path: Option<&Path>,
        concurrency: Option<usize>,
    ) -> Result<ArticleGenerator, ApiError> {
        self.config.ensure_valid()?;

        let categories_path = categories_path.unwrap_or(&self.config.paths.categories_csv);
        let categories = load_category_map(categories_path)?;

        let openai = &self.config.openai;
        let provider = OpenAIClient::new(
            openai.model.clone(),
            openai.api_key.clone().unwrap_or_default(),
            openai.organization.clone().unwrap_or_default(),
            openai.base_url.clone(),
        )?;
        let unsplash = &self.config.unsplash;
        let images = UnsplashClient::new(
            unsplash.api_key.clone().unwrap_or_default(),
            unsplash.base_url.clone(),
        )?;

        let completions = CompletionService::with_policy(
            Arc::new(provider),
            self.config.generation.retry_policy(),
        );
        let max_items = concurrency.unwrap_or(self.config.generation.max_concurrent_items);

        Ok(ArticleGenerator::new(
            Arc::new(completions),
            Arc::new(images),
            self.store.clone(),
            Arc::new(categories),
            self.config.prompts.clone(),
        )
        .with_max_concurrent_items(max_items))
    }
}

fn block_on<F: std::future::Future>(future: F) -> Result<F::Output, ApiError> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| ApiError::ProviderError(format!("Failed to create runtime: {}", e)))?;
    Ok(rt.block_on(future))
}
