//! CLI output: error mapping from domain errors to the CLI surface.

use crate::error::ApiError;

/// Map service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::ConfigError(msg) => msg.clone(),
        other => other.to_string(),
    }
}
