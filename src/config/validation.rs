//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and the upstream URL
//! - Validate value ranges (timeouts > 0, body limit > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AdapterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::AdapterConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("listener.path_prefix '{0}' must be empty or start with '/'")]
    InvalidPathPrefix(String),

    #[error("upstream.url is not set")]
    MissingUpstreamUrl,

    #[error("upstream.url '{url}' is invalid: {reason}")]
    InvalidUpstreamUrl { url: String, reason: String },

    #[error("upstream.url must use https, got '{0}'")]
    InsecureUpstreamUrl(String),

    #[error("upstream.{0} is not set")]
    MissingCredential(&'static str),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &AdapterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let prefix = &config.listener.path_prefix;
    if !prefix.is_empty() && !prefix.starts_with('/') {
        errors.push(ValidationError::InvalidPathPrefix(prefix.clone()));
    }

    validate_upstream_url(&config.upstream.url, &mut errors);

    if config.upstream.identifier.is_empty() {
        errors.push(ValidationError::MissingCredential("identifier"));
    }
    if config.upstream.secret.is_empty() {
        errors.push(ValidationError::MissingCredential("secret"));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_upstream_url(raw: &str, errors: &mut Vec<ValidationError>) {
    if raw.is_empty() {
        errors.push(ValidationError::MissingUpstreamUrl);
        return;
    }
    match Url::parse(raw) {
        Ok(url) if url.scheme() == "https" => {}
        Ok(_) => errors.push(ValidationError::InsecureUpstreamUrl(raw.to_string())),
        Err(e) => errors.push(ValidationError::InvalidUpstreamUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        }),
    }
}
