//! Configuration sources: the TOML file and the environment.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "article-gen.toml";

/// Prefix for nested overrides, e.g. `ARTICLE_GEN__OPENAI__MODEL`.
pub const ENV_PREFIX: &str = "ARTICLE_GEN";

/// Legacy variables that hold the secrets, mapped onto their config keys.
pub const SECRET_ENV_VARS: &[(&str, &str)] = &[
    ("OPENAI_ORG", "openai.organization"),
    ("OPENAI_API_KEY", "openai.api_key"),
    ("UNSPLASH_API_KEY", "unsplash.api_key"),
];

/// Add the config file. An explicit path must exist; the default one is optional.
pub fn add_file(
    builder: ConfigBuilder<DefaultState>,
    explicit: Option<&Path>,
) -> ConfigBuilder<DefaultState> {
    match explicit {
        Some(path) => {
            debug!(config_path = %path.display(), "Loading configuration file");
            builder.add_source(File::from(path.to_path_buf()).format(FileFormat::Toml))
        }
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_FILE);
            builder.add_source(File::from(path).format(FileFormat::Toml).required(false))
        }
    }
}

/// Add `ARTICLE_GEN__*` overrides, then the legacy secret variables on top.
pub fn add_environment(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let mut builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    );
    for (var, key) in SECRET_ENV_VARS {
        let value = std::env::var(var).ok().filter(|v| !v.is_empty());
        builder = builder.set_override_option(*key, value)?;
    }
    Ok(builder)
}
