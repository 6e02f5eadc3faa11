//! The binding registry.
//!
//! # Responsibilities
//! - Record which endpoint serves each container
//! - Record which containers the current process serves itself
//! - Install per-route overloads at bind time
//! - Derive bindings from `<PREFIX>_HOST` / `<PREFIX>_PORT`
//!
//! # Design Decisions
//! - One registry per process, constructed by the bootstrap and passed by
//!   reference; there is no global instance
//! - A bind validates every overload target before touching any function,
//!   so a failed bind leaves the container exactly as it was
//! - "Remote" is derived (bound and not local), never stored

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use serde::{Deserialize, Serialize};

use crate::binding::remote::http_handler;
use crate::binding::transport::Transport;
use crate::binding::types::{BindingError, BindingResult};
use crate::function::Handler;
use crate::routing::ApiContainer;

/// Where a container's routes are served.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    base_url: String,
}

impl ServiceEndpoint {
    /// Endpoint reached over plain HTTP at `host:port`.
    pub fn new(host: impl AsRef<str>, port: u16) -> Self {
        Self {
            base_url: format!("http://{}:{}", host.as_ref(), port),
        }
    }

    /// Endpoint with an explicit base URL such as `https://store.internal`.
    pub fn from_base_url(base_url: impl Into<String>) -> BindingResult<Self> {
        let base_url = base_url.into();
        url::Url::parse(&base_url).map_err(|e| BindingError::InvalidEndpoint {
            endpoint: base_url.clone(),
            message: e.to_string(),
        })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url)
    }
}

/// Route-name → handler pairs installed by [`ArchitectureBinding::bind`].
#[derive(Clone, Default)]
pub struct Overloads(Vec<(String, Handler)>);

impl Overloads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an overload for the route called `route`.
    pub fn with(mut self, route: impl Into<String>, handler: Handler) -> Self {
        self.0.push((route.into(), handler));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<N: Into<String>> FromIterator<(N, Handler)> for Overloads {
    fn from_iter<I: IntoIterator<Item = (N, Handler)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(n, h)| (n.into(), h)).collect())
    }
}

impl fmt::Debug for Overloads {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter().map(|(name, _)| name)).finish()
    }
}

/// Binding between containers and their runtime endpoints.
#[derive(Debug, Default)]
pub struct ArchitectureBinding {
    bindings: DashMap<String, ServiceEndpoint>,
    local: DashSet<String>,
}

impl ArchitectureBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `container` to `endpoint` and install `overloads` on its routes.
    ///
    /// Fails with a route-not-found error, and changes nothing, if any
    /// overload names a route the container does not have.
    pub fn bind(
        &self,
        container: &ApiContainer,
        endpoint: ServiceEndpoint,
        overloads: Overloads,
    ) -> BindingResult<()> {
        let mut targets = Vec::with_capacity(overloads.len());
        for (name, handler) in overloads.0 {
            let entry = container.get_route(&name)?;
            targets.push((name, entry.handler.clone(), handler));
        }

        tracing::info!(
            container = %container.id(),
            endpoint = %endpoint,
            overloads = targets.len(),
            "Binding container"
        );

        self.bindings.insert(container.id().to_string(), endpoint);
        for (name, function, handler) in targets {
            tracing::debug!(container = %container.id(), route = %name, function = %function.id(), "Overloading route");
            function.overload(handler);
        }
        Ok(())
    }

    /// Bind `container` from `<PREFIX>_HOST` and `<PREFIX>_PORT`.
    ///
    /// Returns `Ok(false)` without binding when either variable is absent.
    pub fn bind_from_env(
        &self,
        container: &ApiContainer,
        prefix: &str,
        overloads: Overloads,
    ) -> BindingResult<bool> {
        self.bind_from_lookup(container, prefix, overloads, |key| std::env::var(key).ok())
    }

    /// Like [`bind_from_env`](Self::bind_from_env) with an explicit variable source.
    pub fn bind_from_lookup<F>(
        &self,
        container: &ApiContainer,
        prefix: &str,
        overloads: Overloads,
        lookup: F,
    ) -> BindingResult<bool>
    where
        F: Fn(&str) -> Option<String>,
    {
        match endpoint_from_lookup(prefix, &lookup)? {
            Some(endpoint) => {
                self.bind(container, endpoint, overloads)?;
                Ok(true)
            }
            None => {
                tracing::debug!(container = %container.id(), prefix = %prefix, "No environment binding, keeping defaults");
                Ok(false)
            }
        }
    }

    /// Strict variant of [`bind_from_env`](Self::bind_from_env): a missing
    /// variable is a configuration error.
    pub fn require_env_binding(
        &self,
        container: &ApiContainer,
        prefix: &str,
        overloads: Overloads,
    ) -> BindingResult<()> {
        self.require_lookup_binding(container, prefix, overloads, |key| std::env::var(key).ok())
    }

    pub fn require_lookup_binding<F>(
        &self,
        container: &ApiContainer,
        prefix: &str,
        overloads: Overloads,
        lookup: F,
    ) -> BindingResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        for suffix in ["HOST", "PORT"] {
            let var = format!("{}_{}", prefix, suffix);
            if lookup(&var).is_none() {
                return Err(BindingError::MissingEnvBinding {
                    container: container.id().to_string(),
                    var,
                });
            }
        }
        self.bind_from_lookup(container, prefix, overloads, lookup).map(|_| ())
    }

    /// Bind `container` and overload every route with an outbound call to
    /// `endpoint` through `transport`.
    pub fn bind_remote(
        &self,
        container: &ApiContainer,
        endpoint: ServiceEndpoint,
        transport: Arc<dyn Transport>,
    ) -> BindingResult<()> {
        let overloads = remote_overloads(container, &endpoint, transport)?;
        self.bind(container, endpoint, overloads)
    }

    /// [`bind_remote`](Self::bind_remote) with the endpoint taken from the environment.
    pub fn bind_remote_from_env(
        &self,
        container: &ApiContainer,
        prefix: &str,
        transport: Arc<dyn Transport>,
    ) -> BindingResult<bool> {
        self.bind_remote_from_lookup(container, prefix, transport, |key| std::env::var(key).ok())
    }

    pub fn bind_remote_from_lookup<F>(
        &self,
        container: &ApiContainer,
        prefix: &str,
        transport: Arc<dyn Transport>,
        lookup: F,
    ) -> BindingResult<bool>
    where
        F: Fn(&str) -> Option<String>,
    {
        match endpoint_from_lookup(prefix, &lookup)? {
            Some(endpoint) => {
                self.bind_remote(container, endpoint, transport)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn get_endpoint(&self, container: &ApiContainer) -> Option<ServiceEndpoint> {
        self.endpoint_for(container.id())
    }

    pub fn endpoint_for(&self, container_id: &str) -> Option<ServiceEndpoint> {
        self.bindings.get(container_id).map(|e| e.value().clone())
    }

    /// Snapshot of every recorded binding.
    pub fn bindings(&self) -> HashMap<String, ServiceEndpoint> {
        self.bindings
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    /// Mark `container` as served by this process.
    pub fn mark_local(&self, container: &ApiContainer) {
        tracing::debug!(container = %container.id(), "Container marked local");
        self.local.insert(container.id().to_string());
    }

    pub fn is_local(&self, container: &ApiContainer) -> bool {
        self.local.contains(container.id())
    }

    /// Bound to an endpoint and not served by this process.
    pub fn is_remote(&self, container: &ApiContainer) -> bool {
        self.bindings.contains_key(container.id()) && !self.is_local(container)
    }
}

/// Build one outbound-call overload per route of `container`.
pub fn remote_overloads(
    container: &ApiContainer,
    endpoint: &ServiceEndpoint,
    transport: Arc<dyn Transport>,
) -> BindingResult<Overloads> {
    container
        .list_routes()
        .into_iter()
        .map(|name| {
            let h = http_handler(endpoint, container, name, transport.clone())?;
            Ok((name.to_string(), h))
        })
        .collect::<BindingResult<Vec<(String, Handler)>>>()
        .map(Overloads::from_iter)
}

fn endpoint_from_lookup<F>(prefix: &str, lookup: &F) -> BindingResult<Option<ServiceEndpoint>>
where
    F: Fn(&str) -> Option<String>,
{
    let host_var = format!("{}_HOST", prefix);
    let port_var = format!("{}_PORT", prefix);
    let (Some(host), Some(port)) = (lookup(&host_var), lookup(&port_var)) else {
        return Ok(None);
    };
    let port: u16 = port.trim().parse().map_err(|_| BindingError::InvalidPort {
        var: port_var,
        value: port.clone(),
    })?;
    Ok(Some(ServiceEndpoint::new(host, port)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::{handler, Function};
    use serde_json::json;

    fn container() -> (ApiContainer, Arc<Function>, Arc<Function>) {
        let store = Arc::new(Function::placeholder("store-handler"));
        let get = Arc::new(Function::new("get-handler", handler(|_| async { Ok(json!("default")) })));
        let mut c = ApiContainer::new("greeted-store");
        c.add_route("store", "POST /store/{collection}", store.clone()).unwrap();
        c.add_route("get", "GET /get/{collection}", get.clone()).unwrap();
        (c, store, get)
    }

    fn lookup(vars: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| vars.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
    }

    #[tokio::test]
    async fn test_bind_installs_overloads() {
        let (c, store, get) = container();
        let registry = ArchitectureBinding::new();
        registry
            .bind(
                &c,
                ServiceEndpoint::new("jsonstore", 3001),
                Overloads::new().with("store", handler(|_| async { Ok(json!({"success": true})) })),
            )
            .unwrap();

        assert!(store.has_overload());
        assert!(!get.has_overload());
        assert_eq!(store.invoke(vec![]).await, Ok(json!({"success": true})));
        assert_eq!(
            registry.get_endpoint(&c).map(|e| e.base_url().to_string()),
            Some("http://jsonstore:3001".to_string())
        );
    }

    #[tokio::test]
    async fn test_failed_bind_mutates_nothing() {
        let (c, store, get) = container();
        let registry = ArchitectureBinding::new();
        let err = registry
            .bind(
                &c,
                ServiceEndpoint::new("jsonstore", 3001),
                Overloads::new()
                    .with("get", handler(|_| async { Ok(json!("overloaded")) }))
                    .with("x", handler(|_| async { Ok(json!(null)) })),
            )
            .unwrap_err();

        assert_eq!(err.to_string(), "Route 'x' not found in container 'greeted-store'");
        assert!(!get.has_overload());
        assert!(!store.has_overload());
        assert_eq!(get.invoke(vec![]).await, Ok(json!("default")));
        assert!(registry.get_endpoint(&c).is_none());
    }

    #[test]
    fn test_local_and_remote_are_independent() {
        let (c, _, _) = container();
        let registry = ArchitectureBinding::new();
        assert!(!registry.is_local(&c));
        assert!(!registry.is_remote(&c));

        registry.bind(&c, ServiceEndpoint::new("h", 1), Overloads::new()).unwrap();
        assert!(registry.is_remote(&c));

        registry.mark_local(&c);
        assert!(registry.is_local(&c));
        assert!(!registry.is_remote(&c));
        assert_eq!(registry.bindings().len(), 1);
    }

    #[test]
    fn test_bind_from_lookup_is_noop_without_vars() {
        let (c, _, _) = container();
        let registry = ArchitectureBinding::new();
        let bound = registry
            .bind_from_lookup(&c, "JSONSTORE", Overloads::new(), lookup(&[("JSONSTORE_HOST", "db")]))
            .unwrap();
        assert!(!bound);
        assert!(registry.get_endpoint(&c).is_none());
    }

    #[test]
    fn test_bind_from_lookup_binds() {
        let (c, _, _) = container();
        let registry = ArchitectureBinding::new();
        let bound = registry
            .bind_from_lookup(
                &c,
                "JSONSTORE",
                Overloads::new(),
                lookup(&[("JSONSTORE_HOST", "jsonstore"), ("JSONSTORE_PORT", "3001")]),
            )
            .unwrap();
        assert!(bound);
        assert_eq!(registry.get_endpoint(&c), Some(ServiceEndpoint::new("jsonstore", 3001)));
    }

    #[test]
    fn test_bad_port_is_error() {
        let (c, _, _) = container();
        let registry = ArchitectureBinding::new();
        let err = registry
            .bind_from_lookup(
                &c,
                "JSONSTORE",
                Overloads::new(),
                lookup(&[("JSONSTORE_HOST", "jsonstore"), ("JSONSTORE_PORT", "http")]),
            )
            .unwrap_err();
        assert!(matches!(err, BindingError::InvalidPort { .. }));
    }

    #[test]
    fn test_strict_binding_requires_vars() {
        let (c, _, _) = container();
        let registry = ArchitectureBinding::new();
        let err = registry
            .require_lookup_binding(&c, "JSONSTORE", Overloads::new(), lookup(&[("JSONSTORE_HOST", "db")]))
            .unwrap_err();
        assert_eq!(
            err,
            BindingError::MissingEnvBinding {
                container: "greeted-store".into(),
                var: "JSONSTORE_PORT".into()
            }
        );
    }

    #[test]
    fn test_endpoint_from_base_url() {
        let e = ServiceEndpoint::from_base_url("https://store.internal/").unwrap();
        assert_eq!(e.base_url(), "https://store.internal");
        assert!(ServiceEndpoint::from_base_url("not a url").is_err());
    }
}
