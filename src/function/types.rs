//! Invocation error definitions.

use thiserror::Error;

/// Errors produced while invoking a function.
///
/// Every variant renders to a human-readable message; dispatch adapters put
/// that message into the `error` field of a 500 response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvokeError {
    /// A placeholder function was invoked before an overload was installed.
    #[error("Function '{0}' is not implemented. Provide an overload before invoking.")]
    NotImplemented(String),

    /// The handler itself failed.
    #[error("{0}")]
    Handler(String),

    /// The outbound call could not be completed.
    #[error("Transport error calling {url}: {message}")]
    Transport { url: String, message: String },

    /// The remote side answered with a non-success status.
    #[error("Remote call to {method} {url} failed with status {status}: {body}")]
    Remote {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    /// A request or response payload could not be decoded.
    #[error("{0}")]
    Decode(String),

    /// The handler panicked while running.
    #[error("Handler for '{0}' panicked")]
    Panicked(String),
}

impl InvokeError {
    /// Convenience constructor for handler failures.
    pub fn handler(message: impl Into<String>) -> Self {
        InvokeError::Handler(message.into())
    }
}

impl From<serde_json::Error> for InvokeError {
    fn from(e: serde_json::Error) -> Self {
        InvokeError::Decode(e.to_string())
    }
}

/// Result type for function invocations.
pub type InvokeResult<T = serde_json::Value> = Result<T, InvokeError>;
