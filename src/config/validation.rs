//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Detect containers bound twice
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid listener bind_address '{0}'")]
    BindAddress(String),

    #[error("invalid metrics_address '{0}'")]
    MetricsAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("listener.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("binding for '{0}' has an empty host")]
    EmptyHost(String),

    #[error("binding for '{0}' has port 0")]
    ZeroPort(String),

    #[error("env binding for '{0}' has an empty prefix")]
    EmptyPrefix(String),

    #[error("container '{0}' is bound more than once")]
    DuplicateBinding(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(config.observability.metrics_address.clone()));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let mut seen = HashSet::new();
    for b in &config.bindings {
        if b.host.trim().is_empty() {
            errors.push(ValidationError::EmptyHost(b.container.clone()));
        }
        if b.port == 0 {
            errors.push(ValidationError::ZeroPort(b.container.clone()));
        }
        if !seen.insert(b.container.as_str()) {
            errors.push(ValidationError::DuplicateBinding(b.container.clone()));
        }
    }
    for b in &config.env_bindings {
        if b.prefix.trim().is_empty() {
            errors.push(ValidationError::EmptyPrefix(b.container.clone()));
        }
        if !seen.insert(b.container.as_str()) {
            errors.push(ValidationError::DuplicateBinding(b.container.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
