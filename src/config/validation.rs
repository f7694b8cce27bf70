//! Configuration validation.
//!
//! Semantic checks only; serde handles syntax. Every problem is reported,
//! not just the first.

use axum::http::HeaderName;
use thiserror::Error;
use url::Url;

use crate::config::schema::ServiceConfig;
use crate::logging::Severity;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("logging.level: {0}")]
    InvalidLevel(String),

    #[error("logging.subsystem must not be empty")]
    EmptySubsystem,

    #[error("logging.request_id_header {0:?} is not a valid header name")]
    InvalidHeader(String),

    #[error("upstream.url {url:?}: {reason}")]
    InvalidUpstreamUrl { url: String, reason: String },

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("listener.bind_address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("admin.api_key must be set when the admin API is enabled")]
    MissingAdminKey,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = Severity::parse(&config.logging.level) {
        errors.push(ValidationError::InvalidLevel(e.to_string()));
    }
    if config.logging.subsystem.trim().is_empty() {
        errors.push(ValidationError::EmptySubsystem);
    }
    if HeaderName::from_bytes(config.logging.request_id_header.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidHeader(
            config.logging.request_id_header.clone(),
        ));
    }
    if let Err(e) = Url::parse(&config.upstream.url) {
        errors.push(ValidationError::InvalidUpstreamUrl {
            url: config.upstream.url.clone(),
            reason: e.to_string(),
        });
    }
    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("upstream.timeout_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }
    if config
        .listener
        .bind_address
        .parse::<std::net::SocketAddr>()
        .is_err()
    {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.admin.enabled && config.admin.api_key.is_empty() {
        errors.push(ValidationError::MissingAdminKey);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
