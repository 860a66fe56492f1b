//! Tracing subscriber setup.

use anyhow::Context;
use gatewire_proxy::GatewayConfig;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level; colours only in development.
pub fn init(config: &GatewayConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.effective_log_level())
            .with_context(|| format!("invalid log level {:?}", config.effective_log_level()))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(!config.environment.is_production())
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}
