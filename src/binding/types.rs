//! Binding error definitions.

use thiserror::Error;

use crate::routing::RouteError;

/// Configuration errors raised while binding containers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BindingError {
    /// An overload targets a route that the container does not have.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// `<PREFIX>_PORT` was present but not a valid port number.
    #[error("Invalid port '{value}' in {var}")]
    InvalidPort { var: String, value: String },

    /// Strict binding was requested but the environment lacks a variable.
    #[error("Missing environment binding {var} for container '{container}'")]
    MissingEnvBinding { container: String, var: String },

    /// The endpoint does not form a valid base URL.
    #[error("Invalid endpoint '{endpoint}': {message}")]
    InvalidEndpoint { endpoint: String, message: String },
}

/// Result type for binding operations.
pub type BindingResult<T> = Result<T, BindingError>;
