//! Route table error definitions.

use thiserror::Error;

/// Configuration errors raised while building or querying a route table.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteError {
    /// A route with this name is already registered in the container.
    #[error("Duplicate route name '{route}' in container '{container}'")]
    DuplicateRoute { route: String, container: String },

    /// No route with this name exists in the container.
    #[error("Route '{route}' not found in container '{container}'")]
    RouteNotFound { route: String, container: String },

    /// The method token of a route string is not a valid HTTP method.
    #[error("Invalid HTTP method '{0}' in route")]
    InvalidMethod(String),

    /// The function is already registered in another container.
    #[error("Function '{function}' already belongs to container '{owner}', cannot add it to '{container}'")]
    SharedFunction {
        function: String,
        owner: String,
        container: String,
    },

    /// The compiled matcher failed to build.
    #[error("Invalid route pattern '{path}': {message}")]
    InvalidPattern { path: String, message: String },
}

/// Result type for route table operations.
pub type RouteResult<T> = Result<T, RouteError>;
