//! Axum HTTP server for the gateway.
//!
//! `serve()` runs on a pre-bound listener until the cancellation token
//! fires, then drains in-flight requests.

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::routes::create_router;
use crate::state::AppState;

pub async fn serve(
    listener: TcpListener,
    state: AppState,
    cancel: CancellationToken,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!(
        backend = %state.backend.base_url(),
        target_model = %state.config.target_model,
        environment = %state.config.environment,
        "Gateway listening on {addr}"
    );

    let app = create_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;

    info!("Gateway shut down");
    Ok(())
}
