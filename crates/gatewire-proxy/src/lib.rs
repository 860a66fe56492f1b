#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

// Dev-dependencies used only by the integration tests
#[cfg(test)]
use http_body_util as _;
#[cfg(test)]
use tower as _;

pub mod backend;
pub mod config;
pub mod error;
pub mod handlers;
pub mod request_id;
pub mod routes;
pub mod server;
pub mod state;
pub mod stream;

pub use backend::HttpBackend;
pub use config::{ConfigError, CorsConfig, Environment, GatewayConfig};
pub use error::HttpError;
pub use routes::create_router;
pub use server::serve;
pub use state::{AppState, GatewayState};
