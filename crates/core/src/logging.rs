//! Structured logging infrastructure for SignalMesh.
//!
//! This module provides centralized logging initialization with support
//! for structured JSON output and environment-based configuration.

use crate::config::LoggingConfig;
use tracing::Subscriber;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install human-readable logging at `info`.
///
/// Panics if a global subscriber is already set. Networks log lifecycle
/// transitions at `info`; convergence passes and broadcasts need `debug`,
/// single notifications `trace`.
///
/// # Example
/// ```no_run
/// use signalmesh_core::logging;
///
/// // RUST_LOG=signalmesh::network=debug shows every refresh and broadcast
/// logging::init();
/// tracing::info!(members = 5, "Circuit placed");
/// ```
pub fn init() {
    subscriber("info", false).init();
}

/// Install JSON-lines logging at `info`, one object per event.
///
/// # Example
/// ```no_run
/// use signalmesh_core::logging;
///
/// logging::init_json();
/// tracing::warn!(budget = 65_536, "Propagation budget exhausted");
/// ```
pub fn init_json() {
    subscriber("info", true).init();
}

/// Install logging as described by a [`LoggingConfig`]. `RUST_LOG` still
/// takes precedence over the configured level.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_from_config(config: &LoggingConfig) -> bool {
    subscriber(&config.level, config.json).try_init().is_ok()
}

/// Registry with an env filter and exactly one of the text or JSON layers.
fn subscriber(default_level: &str, json: bool) -> impl Subscriber + Send + Sync + 'static {
    let text = (!json).then(|| fmt::layer().with_target(true));
    let lines = json.then(|| fmt::layer().json().with_target(true).with_current_span(false));
    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(text)
        .with(lines)
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}
