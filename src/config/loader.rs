//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ClusterConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading and pool construction.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Invalid host address '{address}': {reason}")]
    InvalidHost { address: String, reason: String },

    #[error("HTTP transport setup failed: {0}")]
    Transport(#[from] reqwest::Error),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ClusterConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ClusterConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(
        path = %path.display(),
        hosts = config.hosts.len(),
        "Configuration loaded"
    );
    Ok(config)
}
