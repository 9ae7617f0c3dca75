//! Merge rules: defaults first, then files, then environment.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("generation.max_concurrent_items", 4)?
        .set_default("generation.max_attempts", 5)?
        .set_default("generation.retry_delay_ms", 1000)?
        .set_default("paths.store_path", "db/article_completions")?
        .set_default("paths.keywords_csv", "keywords.csv")?
        .set_default("paths.categories_csv", "categories.csv")?
        .set_default("paths.export_dir", "generated")?
        .set_default("paths.export_file", "generated.csv")
}
