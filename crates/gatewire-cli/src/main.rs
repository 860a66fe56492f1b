//! `gatewire` entry point - the composition root.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use gatewire_cli::{Cli, logging, shutdown};
use gatewire_proxy::{GatewayState, serve};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads them
    dotenvy::dotenv().ok();

    let config = Cli::parse().into_config()?;
    logging::init(&config)?;

    let addr = config.bind_addr();
    let state = GatewayState::from_config(config)?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    let cancel = CancellationToken::new();
    let signals = shutdown::cancel_on_signal(cancel.clone());

    let result = serve(listener, Arc::new(state), cancel.clone()).await;
    cancel.cancel();
    let _ = signals.await;

    result.context("server error")
}
