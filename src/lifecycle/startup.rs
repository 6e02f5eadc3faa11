//! Startup orchestration.
//!
//! # Responsibilities
//! - Apply configured bindings before any traffic
//! - Refuse to serve a container with unimplemented functions
//! - Bind the listener and run the server last
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Bindings are applied in config order, static before environment

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::binding::{ArchitectureBinding, BindingError, Overloads, ServiceEndpoint, Transport};
use crate::config::ServerConfig;
use crate::http::ApiServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::routing::ApiContainer;

/// Errors that stop a process before it serves traffic.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error("Configuration names unknown container '{0}'")]
    UnknownContainer(String),

    #[error("Container '{container}' has unimplemented functions: {}", .functions.join(", "))]
    Unimplemented {
        container: String,
        functions: Vec<String>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn find<'a>(containers: &[&'a ApiContainer], id: &str) -> Result<&'a ApiContainer, StartupError> {
    containers
        .iter()
        .copied()
        .find(|c| c.id() == id)
        .ok_or_else(|| StartupError::UnknownContainer(id.to_string()))
}

/// Apply the static and environment bindings from `config`.
///
/// Bindings marked `remote` forward every route through `transport`.
pub fn apply_bindings(
    config: &ServerConfig,
    binding: &ArchitectureBinding,
    containers: &[&ApiContainer],
    transport: Arc<dyn Transport>,
) -> Result<(), StartupError> {
    apply_bindings_with(config, binding, containers, transport, |key| std::env::var(key).ok())
}

/// [`apply_bindings`] with an explicit environment source.
pub fn apply_bindings_with<F>(
    config: &ServerConfig,
    binding: &ArchitectureBinding,
    containers: &[&ApiContainer],
    transport: Arc<dyn Transport>,
    lookup: F,
) -> Result<(), StartupError>
where
    F: Fn(&str) -> Option<String>,
{
    for b in &config.bindings {
        let container = find(containers, &b.container)?;
        let endpoint = ServiceEndpoint::new(&b.host, b.port);
        if b.remote {
            binding.bind_remote(container, endpoint, transport.clone())?;
        } else {
            binding.bind(container, endpoint, Overloads::new())?;
        }
    }

    for b in &config.env_bindings {
        let container = find(containers, &b.container)?;
        if config.strict_env {
            for suffix in ["HOST", "PORT"] {
                let var = format!("{}_{}", b.prefix, suffix);
                if lookup(&var).is_none() {
                    return Err(BindingError::MissingEnvBinding {
                        container: container.id().to_string(),
                        var,
                    }
                    .into());
                }
            }
        }
        let bound = if b.remote {
            binding.bind_remote_from_lookup(container, &b.prefix, transport.clone(), &lookup)?
        } else {
            binding.bind_from_lookup(container, &b.prefix, Overloads::new(), &lookup)?
        };
        if !bound {
            tracing::info!(container = %container.id(), prefix = %b.prefix, "Environment binding absent, using defaults");
        }
    }
    Ok(())
}

/// Fail if `container` still has placeholder functions without overloads.
pub fn ensure_ready(container: &ApiContainer) -> Result<(), StartupError> {
    let unresolved = container.validate_overloads();
    if unresolved.is_empty() {
        return Ok(());
    }
    Err(StartupError::Unimplemented {
        container: container.id().to_string(),
        functions: unresolved.iter().map(|f| f.id().to_string()).collect(),
    })
}

/// Check readiness, bind the configured address and serve `container`
/// until `shutdown` fires.
pub async fn serve(
    container: Arc<ApiContainer>,
    binding: &ArchitectureBinding,
    config: &ServerConfig,
    shutdown: &Shutdown,
) -> Result<(), StartupError> {
    ensure_ready(&container)?;
    if shutdown.is_triggered() {
        tracing::info!(container = %container.id(), "Shutdown already requested, not serving");
        return Ok(());
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        container = %container.id(),
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let server = ApiServer::new(container, binding, config);
    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::ReqwestTransport;
    use crate::config::{BindingConfig, EnvBindingConfig};
    use crate::store::JsonStore;

    fn transport() -> Arc<dyn Transport> {
        Arc::new(ReqwestTransport::new())
    }

    #[test]
    fn test_static_remote_binding_overloads_all_routes() {
        let store = JsonStore::new("greeted-store").unwrap();
        let container: &ApiContainer = store.container();
        let binding = ArchitectureBinding::new();
        let mut config = ServerConfig::default();
        config.bindings.push(BindingConfig {
            container: "greeted-store".into(),
            host: "jsonstore".into(),
            port: 3001,
            remote: true,
        });

        apply_bindings_with(&config, &binding, &[container], transport(), |_| None).unwrap();
        assert!(binding.is_remote(store.container()));
        assert!(ensure_ready(store.container()).is_ok());
    }

    #[test]
    fn test_unknown_container() {
        let store = JsonStore::new("greeted-store").unwrap();
        let container: &ApiContainer = store.container();
        let mut config = ServerConfig::default();
        config.bindings.push(BindingConfig {
            container: "missing".into(),
            host: "h".into(),
            port: 1,
            remote: false,
        });
        let err = apply_bindings_with(&config, &ArchitectureBinding::new(), &[container], transport(), |_| None)
            .unwrap_err();
        assert!(matches!(err, StartupError::UnknownContainer(id) if id == "missing"));
    }

    #[test]
    fn test_env_binding_absent_is_silent_unless_strict() {
        let store = JsonStore::new("greeted-store").unwrap();
        let container: &ApiContainer = store.container();
        let binding = ArchitectureBinding::new();
        let mut config = ServerConfig::default();
        config.env_bindings.push(EnvBindingConfig {
            container: "greeted-store".into(),
            prefix: "JSONSTORE".into(),
            remote: true,
        });

        apply_bindings_with(&config, &binding, &[container], transport(), |_| None).unwrap();
        assert!(binding.get_endpoint(store.container()).is_none());

        let err = ensure_ready(store.container()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Container 'greeted-store' has unimplemented functions: store-handler, get-handler"
        );

        config.strict_env = true;
        let err = apply_bindings_with(&config, &binding, &[container], transport(), |_| None).unwrap_err();
        assert!(matches!(err, StartupError::Binding(BindingError::MissingEnvBinding { .. })));
    }

    #[tokio::test]
    async fn test_serve_skips_when_shutdown_already_requested() {
        let app = crate::demo::HelloWorld::new().unwrap();
        let shutdown = Shutdown::new();
        shutdown.trigger();
        let mut config = ServerConfig::default();
        config.listener.bind_address = "127.0.0.1:0".into();

        serve(app.api.clone(), &ArchitectureBinding::new(), &config, &shutdown)
            .await
            .unwrap();
        assert_eq!(shutdown.servers(), 0);
    }
}
