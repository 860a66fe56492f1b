//! Shared application state.

use std::sync::Arc;
use std::time::Instant;

use gatewire_core::{ChatBackend, GatewayError};

use crate::backend::HttpBackend;
use crate::config::GatewayConfig;

/// Application state shared across all handlers.
pub type AppState = Arc<GatewayState>;

/// Immutable per-process context. Nothing request-scoped lives here.
pub struct GatewayState {
    pub config: GatewayConfig,
    pub backend: Arc<dyn ChatBackend>,
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(config: GatewayConfig, backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            config,
            backend,
            started_at: Instant::now(),
        }
    }

    /// State backed by a real HTTP backend at `config.backend_url`.
    pub fn from_config(config: GatewayConfig) -> Result<Self, GatewayError> {
        let backend = HttpBackend::new(&config)?;
        Ok(Self::new(config, Arc::new(backend)))
    }
}
