//! Integration tests for layered configuration loading

use article_gen::config::{ConfigLoader, ValidationError};
use std::sync::Mutex;
use tempfile::TempDir;

// Serializes access to process environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const VARS: &[&str] = &[
    "OPENAI_ORG",
    "OPENAI_API_KEY",
    "UNSPLASH_API_KEY",
    "ARTICLE_GEN__PATHS__EXPORT_FILE",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
fn test_file_and_env_layers_combine() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let temp = TempDir::new().unwrap();
    let config_file = temp.path().join("custom.toml");
    std::fs::write(
        &config_file,
        r#"
[openai]
organization = "org-from-file"

[unsplash]
api_key = "unsplash-from-file"

[paths]
export_dir = "out"

[logging]
level = "debug"
format = "json"
"#,
    )
    .unwrap();

    std::env::set_var("OPENAI_API_KEY", "sk-from-env");
    std::env::set_var("ARTICLE_GEN__PATHS__EXPORT_FILE", "articles.csv");
    let config = ConfigLoader::load(Some(&config_file));
    clear_env();
    let config = config.unwrap();

    assert_eq!(config.openai.organization.as_deref(), Some("org-from-file"));
    assert_eq!(config.openai.api_key.as_deref(), Some("sk-from-env"));
    assert_eq!(config.paths.export_path(), std::path::PathBuf::from("out/articles.csv"));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_secrets_are_fatal_and_named() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let temp = TempDir::new().unwrap();
    let config_file = temp.path().join("empty.toml");
    std::fs::write(&config_file, "").unwrap();

    let config = ConfigLoader::load(Some(&config_file)).unwrap();
    assert_eq!(
        config.validate().unwrap_err(),
        vec![
            ValidationError::MissingSecret("OPENAI_ORG"),
            ValidationError::MissingSecret("OPENAI_API_KEY"),
            ValidationError::MissingSecret("UNSPLASH_API_KEY"),
        ]
    );
    let err = config.ensure_valid().unwrap_err();
    assert!(err.to_string().contains("No UNSPLASH_API_KEY env found"));
}
