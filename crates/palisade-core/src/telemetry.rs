//! Telemetry bootstrap for structured logging.
//!
//! Initializes the `tracing` subscriber used across the workspace. Cache
//! hit/miss activity, retry attempts, and breaker transitions all log
//! through `tracing`; this module wires the output.

use crate::PalisadeResult;
use serde::{Deserialize, Serialize};

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Whether to emit log output to the console.
    #[serde(default = "default_console_output")]
    pub console_output: bool,

    /// Filter directives used when `RUST_LOG` is not set
    /// (e.g. `"info,palisade=debug"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

fn default_console_output() -> bool {
    true
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            console_output: default_console_output(),
            filter: None,
        }
    }
}

/// Initialize the tracing subscriber with the given configuration.
///
/// `RUST_LOG` takes precedence over the configured filter. Returns an
/// error if a global subscriber is already installed.
#[cfg(feature = "telemetry")]
pub fn init_telemetry(config: &TelemetryConfig) -> PalisadeResult<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    if !config.console_output {
        return Ok(());
    }

    let fallback = config
        .filter
        .clone()
        .unwrap_or_else(|| "info,palisade=debug".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| crate::PalisadeError::internal(format!("Failed to init telemetry: {}", e)))?;

    tracing::info!("Telemetry initialized");
    Ok(())
}

/// Placeholder for when the telemetry feature is disabled.
#[cfg(not(feature = "telemetry"))]
pub fn init_telemetry(_config: &TelemetryConfig) -> PalisadeResult<()> {
    Ok(())
}
