//! Configuration schema definitions.
//!
//! This module defines the configuration structure for a dispatch server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for a server process.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Containers bound to fixed endpoints.
    pub bindings: Vec<BindingConfig>,

    /// Containers bound from `<PREFIX>_HOST` / `<PREFIX>_PORT`.
    pub env_bindings: Vec<EnvBindingConfig>,

    /// Fail startup when an env binding's variables are missing.
    pub strict_env: bool,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Largest request body accepted, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Outer request timeout applied by the HTTP server, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,

    /// Emit JSON log lines instead of the pretty format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: None,
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A container bound to a fixed host and port.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BindingConfig {
    /// Container id (e.g., "greeted-store").
    pub container: String,

    pub host: String,

    pub port: u16,

    /// Forward every route of the container to this endpoint.
    #[serde(default = "default_remote")]
    pub remote: bool,
}

/// A container bound from environment variables.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnvBindingConfig {
    /// Container id.
    pub container: String,

    /// Variable prefix; `JSONSTORE` reads `JSONSTORE_HOST` and `JSONSTORE_PORT`.
    pub prefix: String,

    /// Forward every route of the container to the bound endpoint.
    #[serde(default = "default_remote")]
    pub remote: bool,
}

fn default_remote() -> bool {
    true
}
