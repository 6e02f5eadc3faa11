//! Route tables attached to named containers.
//!
//! # Responsibilities
//! - Store (name → pattern + function) entries in registration order
//! - Look routes up by name
//! - Report placeholder functions that still lack an overload
//!
//! # Design Decisions
//! - Duplicate names are rejected, never overwritten
//! - A function registered in one container cannot join another
//! - Registration order is the match order used by dispatch adapters
//! - Overlapping patterns are allowed; the earlier route wins and the overlap
//!   is logged at debug level

use std::sync::Arc;

use crate::function::Function;
use crate::routing::pattern::RoutePattern;
use crate::routing::types::{RouteError, RouteResult};

/// A named route: the raw route string, its compiled pattern and its handler.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub name: String,
    pub route: String,
    pub pattern: RoutePattern,
    pub handler: Arc<Function>,
}

/// A container that routes requests to functions.
#[derive(Debug)]
pub struct ApiContainer {
    id: String,
    routes: Vec<RouteEntry>,
}

impl ApiContainer {
    /// Create an empty container.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            routes: Vec::new(),
        }
    }

    /// Build a container from `(name, route, function)` triples.
    pub fn with_routes<I, N, R>(id: impl Into<String>, routes: I) -> RouteResult<Self>
    where
        I: IntoIterator<Item = (N, R, Arc<Function>)>,
        N: Into<String>,
        R: Into<String>,
    {
        let mut container = Self::new(id);
        for (name, route, handler) in routes {
            container.add_route(name, route, handler)?;
        }
        Ok(container)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Register a route under `name`.
    pub fn add_route(
        &mut self,
        name: impl Into<String>,
        route: impl Into<String>,
        handler: Arc<Function>,
    ) -> RouteResult<()> {
        let name = name.into();
        let route = route.into();

        if self.routes.iter().any(|e| e.name == name) {
            return Err(RouteError::DuplicateRoute {
                route: name,
                container: self.id.clone(),
            });
        }

        let pattern = RoutePattern::parse(&route)?;

        handler.claim(&self.id).map_err(|owner| RouteError::SharedFunction {
            function: handler.id().to_string(),
            owner,
            container: self.id.clone(),
        })?;

        if let Some(earlier) = self
            .routes
            .iter()
            .find(|e| e.pattern.method() == pattern.method() && e.pattern.path() == pattern.path())
        {
            tracing::debug!(
                container = %self.id,
                route = %name,
                shadowed_by = %earlier.name,
                "Route pattern duplicates an earlier route and will never match"
            );
        }

        tracing::debug!(container = %self.id, route = %name, pattern = %pattern, "Route registered");

        self.routes.push(RouteEntry {
            name,
            route,
            pattern,
            handler,
        });
        Ok(())
    }

    /// Look up a route by name.
    pub fn get_route(&self, name: &str) -> RouteResult<&RouteEntry> {
        self.routes
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| RouteError::RouteNotFound {
                route: name.to_string(),
                container: self.id.clone(),
            })
    }

    /// Route names in registration order.
    pub fn list_routes(&self) -> Vec<&str> {
        self.routes.iter().map(|e| e.name.as_str()).collect()
    }

    /// Entries in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes.iter()
    }

    /// Placeholder functions that have not been overloaded yet.
    ///
    /// Run this before a container starts accepting traffic.
    pub fn validate_overloads(&self) -> Vec<Arc<Function>> {
        self.routes
            .iter()
            .map(|e| &e.handler)
            .filter(|f| f.is_placeholder() && !f.has_overload())
            .cloned()
            .collect()
    }
}
