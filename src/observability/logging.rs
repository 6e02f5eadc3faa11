//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Choose pretty or JSON output
//! - Resolve the level filter (`RUST_LOG` first, then configuration)

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Filter used when neither `RUST_LOG` nor the configuration sets one.
pub const DEFAULT_FILTER: &str = "arch_dispatch=debug,tower_http=debug";

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed (tests call this
/// repeatedly).
pub fn init_logging(config: &ObservabilityConfig) -> bool {
    let fallback = config
        .log_filter
        .clone()
        .unwrap_or_else(|| DEFAULT_FILTER.to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into());

    let json = config.json_logs;
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .try_init()
        .is_ok()
}
