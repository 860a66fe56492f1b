//! Gateway configuration.
//!
//! Built once at startup by the binary and shared read-only afterwards.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default backend request bound.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Runtime mode. Production hides internal error details from clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::InvalidEnvironment(other.to_string())),
        }
    }
}

/// CORS configuration for the HTTP surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorsConfig {
    /// Allow all origins.
    #[default]
    AllowAll,
    /// Allow specific origins only.
    AllowOrigins(Vec<String>),
}

impl CorsConfig {
    /// An empty origin list means allow all.
    pub fn from_origins(origins: Vec<String>) -> Self {
        let origins: Vec<String> = origins
            .into_iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        if origins.is_empty() {
            Self::AllowAll
        } else {
            Self::AllowOrigins(origins)
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Backend URL must be an http(s) URL, got {0:?}")]
    InvalidBackendUrl(String),

    #[error("Target model cannot be empty")]
    EmptyTargetModel,

    #[error("Listen port cannot be 0")]
    InvalidPort,

    #[error("Request timeout must be at least one second")]
    InvalidTimeout,

    #[error("Unknown environment {0:?} (expected development or production)")]
    InvalidEnvironment(String),
}

/// Everything the gateway needs to serve requests.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the chat-completion backend, without a trailing slash.
    pub backend_url: String,
    /// Sent as a bearer token when present.
    pub backend_api_key: Option<String>,
    /// Model name every translated request is addressed to.
    pub target_model: String,
    pub host: String,
    pub port: u16,
    /// Explicit log filter; `None` picks a default for the environment.
    pub log_level: Option<String>,
    pub environment: Environment,
    pub request_timeout: Duration,
    pub cors: CorsConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:4000".to_string(),
            backend_api_key: None,
            target_model: "gpt-4o".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8082,
            log_level: None,
            environment: Environment::default(),
            request_timeout: DEFAULT_TIMEOUT,
            cors: CorsConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Reject values the gateway cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.backend_url.trim();
        let authority = url
            .strip_prefix("http://")
            .or_else(|| url.strip_prefix("https://"));
        if authority.is_none_or(|rest| rest.trim_matches('/').is_empty()) {
            return Err(ConfigError::InvalidBackendUrl(self.backend_url.clone()));
        }

        if self.target_model.trim().is_empty() {
            return Err(ConfigError::EmptyTargetModel);
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        if self.request_timeout.as_secs() == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        Ok(())
    }

    /// Log filter to install: the explicit level, else `debug` in
    /// development and `info` in production.
    pub fn effective_log_level(&self) -> &str {
        match self.log_level.as_deref() {
            Some(level) if !level.trim().is_empty() => level,
            _ if self.environment.is_production() => "info",
            _ => "debug",
        }
    }

    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Backend URL without trailing slashes.
    pub fn backend_base(&self) -> &str {
        self.backend_url.trim().trim_end_matches('/')
    }
}
