//! Tracing setup: structured logging with span definitions and event types.

pub mod events;
pub mod spans;

use tracing_subscriber::EnvFilter;
use vigil_core::config::ObservabilityConfig;

/// Environment variable holding the log filter directive.
pub const LOG_ENV_VAR: &str = "VIGIL_LOG";

/// Initialize the tracing subscriber with structured JSON output.
///
/// Respects `VIGIL_LOG` for filtering and defaults to `info`. Returns `false`
/// if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .try_init()
        .is_ok()
}

/// Initialize tracing with a custom filter string (for testing or embedding).
pub fn init_tracing_with_filter(filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(true)
        .json()
        .try_init()
        .is_ok()
}

/// Initialize tracing from config. `VIGIL_LOG` still wins over
/// `observability.log_level` when set.
pub fn init_tracing_from_config(config: &ObservabilityConfig) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    }
}
