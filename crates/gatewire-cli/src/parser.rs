//! Command-line and environment configuration.
//!
//! Every option can also come from an environment variable (or a `.env` file
//! loaded before parsing). Flags win over the environment.

use std::time::Duration;

use clap::Parser;
use gatewire_proxy::{ConfigError, CorsConfig, Environment, GatewayConfig};

/// Message-API to chat-completions gateway.
#[derive(Debug, Parser)]
#[command(name = "gatewire")]
#[command(about = "Translate message-API requests to a chat-completions backend")]
#[command(version)]
pub struct Cli {
    /// Base URL of the chat-completions backend
    #[arg(long, env = "BACKEND_BASE_URL", default_value = "http://localhost:4000")]
    pub backend_url: String,

    /// API key sent to the backend as a bearer token
    #[arg(long, env = "BACKEND_API_KEY", hide_env_values = true)]
    pub backend_api_key: Option<String>,

    /// Model every request is forwarded to
    #[arg(long = "model", env = "TARGET_MODEL", default_value = "gpt-4o")]
    pub target_model: String,

    /// Address to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8082)]
    pub port: u16,

    /// Log filter (e.g. `info`, `gatewire_proxy=debug`); RUST_LOG overrides
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// `development` or `production`
    #[arg(long, env = "GATEWAY_ENV", default_value = "development")]
    pub environment: String,

    /// Backend request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 120)]
    pub timeout_secs: u64,

    /// Allowed CORS origin; repeat or comma-separate. Omit to allow all
    #[arg(long = "cors-origin", env = "CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,
}

impl Cli {
    /// Build and validate the gateway configuration.
    pub fn into_config(self) -> Result<GatewayConfig, ConfigError> {
        let config = GatewayConfig {
            backend_url: self.backend_url,
            backend_api_key: self.backend_api_key.filter(|key| !key.trim().is_empty()),
            target_model: self.target_model,
            host: self.host,
            port: self.port,
            log_level: self.log_level,
            environment: self.environment.parse::<Environment>()?,
            request_timeout: Duration::from_secs(self.timeout_secs),
            cors: CorsConfig::from_origins(self.cors_origins),
        };
        config.validate()?;
        Ok(config)
    }
}
