//! Hello-world dispatch server.
//!
//! # Architecture Overview
//!
//! ```text
//!   caller ──▶ api (hello, hellos) ──▶ greeted-store (store, get)
//!                                          │
//!                     ┌────────────────────┼─────────────────────┐
//!                     ▼                    ▼                     ▼
//!               MemoryBackend         KvBackend       remote process over HTTP
//!               (in process)          (in process)    (JSONSTORE_HOST/_PORT)
//! ```
//!
//! `serve api` answers the greeting routes and reaches the store wherever it
//! is bound; `serve greeted-store` hosts the store itself.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};

use arch_dispatch::binding::{ArchitectureBinding, ReqwestTransport, ServiceEndpoint, Transport};
use arch_dispatch::config::{load_config, ServerConfig};
use arch_dispatch::demo::HelloWorld;
use arch_dispatch::lifecycle::signals::spawn_signal_listener;
use arch_dispatch::lifecycle::startup::{apply_bindings, serve};
use arch_dispatch::lifecycle::Shutdown;
use arch_dispatch::observability::{logging, metrics};
use arch_dispatch::store::{KvBackend, MemoryBackend};

#[derive(Parser)]
#[command(name = "arch-dispatch")]
#[command(about = "Serve the hello-world architecture", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve one container over HTTP
    Serve {
        /// Container id (api or greeted-store)
        container: String,

        /// Override the configured listener port
        #[arg(short, long)]
        port: Option<u16>,

        /// Store implementation used when the store is not bound remotely
        #[arg(short, long, value_enum, default_value_t = Backend::Memory)]
        backend: Backend,
    },
    /// Print the architecture definition
    Synth,
    /// List a container's routes
    Routes {
        container: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    Memory,
    Kv,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    let app = HelloWorld::new()?;

    match cli.command {
        Commands::Synth => {
            println!("{}", serde_json::to_string_pretty(&app.architecture.synth())?);
        }
        Commands::Routes { container } => {
            let container = app
                .container(&container)
                .ok_or_else(|| format!("Unknown container '{}'", container))?;
            for entry in container.entries() {
                println!("{:<10} {}", entry.name, entry.pattern);
            }
        }
        Commands::Serve { container, port, backend } => {
            logging::init_logging(&config.observability);
            tracing::info!("arch-dispatch v{} starting", env!("CARGO_PKG_VERSION"));

            if let Some(port) = port {
                config.listener.bind_address = format!("0.0.0.0:{}", port);
            }
            if config.observability.metrics_enabled {
                metrics::init_metrics(config.observability.metrics_address.parse()?);
            }

            let target = app
                .container(&container)
                .cloned()
                .ok_or_else(|| format!("Unknown container '{}'", container))?;

            let binding = ArchitectureBinding::new();
            let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new());
            let containers: Vec<_> = app.containers().into_iter().map(|c| &**c).collect();
            apply_bindings(&config, &binding, &containers, transport)?;

            // Host the store here unless a binding already sends it elsewhere.
            let store = app.json_store.container();
            if binding.get_endpoint(store).is_none() || target.id() == store.id() {
                let overloads = match backend {
                    Backend::Memory => MemoryBackend::new().overloads(),
                    Backend::Kv => KvBackend::default().overloads(),
                };
                let endpoint = ServiceEndpoint::from_base_url(format!("http://{}", config.listener.bind_address))?;
                binding.bind(store, endpoint, overloads)?;
            }

            tracing::info!(
                container = %target.id(),
                bindings = ?binding.bindings(),
                "Bindings applied"
            );

            let shutdown = Arc::new(Shutdown::new());
            spawn_signal_listener(shutdown.clone());
            serve(target, &binding, &config, &shutdown).await?;
            tracing::info!("Shutdown complete");
        }
    }

    Ok(())
}
