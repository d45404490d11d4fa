//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AdapterConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `listener.bind_address`.
pub const ENV_BIND_ADDRESS: &str = "ADAPTER_BIND_ADDRESS";
/// Environment variable overriding `upstream.url`.
pub const ENV_UPSTREAM_URL: &str = "ADAPTER_UPSTREAM_URL";
/// Environment variable overriding `upstream.identifier`.
pub const ENV_UPSTREAM_IDENTIFIER: &str = "ADAPTER_UPSTREAM_IDENTIFIER";
/// Environment variable overriding `upstream.secret`.
pub const ENV_UPSTREAM_SECRET: &str = "ADAPTER_UPSTREAM_SECRET";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, override from the environment, and validate a TOML config file.
pub fn load_config(path: &Path) -> Result<AdapterConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AdapterConfig = toml::from_str(&content)?;
    finalize(config)
}

/// Build a config from defaults plus environment overrides, then validate.
pub fn load_default() -> Result<AdapterConfig, ConfigError> {
    finalize(AdapterConfig::default())
}

fn finalize(mut config: AdapterConfig) -> Result<AdapterConfig, ConfigError> {
    apply_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply overrides from `lookup`, which maps a variable name to its value.
///
/// Empty values are ignored so an exported-but-blank variable does not wipe a
/// setting from the file.
pub fn apply_overrides<F>(config: &mut AdapterConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

    if let Some(value) = get(ENV_BIND_ADDRESS) {
        config.listener.bind_address = value;
    }
    if let Some(value) = get(ENV_UPSTREAM_URL) {
        config.upstream.url = value;
    }
    if let Some(value) = get(ENV_UPSTREAM_IDENTIFIER) {
        config.upstream.identifier = value;
    }
    if let Some(value) = get(ENV_UPSTREAM_SECRET) {
        config.upstream.secret = value;
    }
}
