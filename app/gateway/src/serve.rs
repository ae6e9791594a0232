//! Shared gateway serve entrypoint — used by the binary and tests.

use crate::{config::GatewayConfig, state::AppState};
use anyhow::Result;
use tokio::sync::oneshot;

/// Handle returned by [`serve`] — holds the bound port and shutdown
/// trigger.
pub struct ServeHandle {
    /// The port the gateway is listening on.
    pub port: u16,
    /// Send a value to trigger graceful shutdown.
    shutdown_tx: Option<oneshot::Sender<()>>,
    /// Join handle for the server task.
    join: Option<tokio::task::JoinHandle<Result<(), std::io::Error>>>,
}

impl ServeHandle {
    /// Trigger graceful shutdown and wait for the server to stop.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            join.await??;
        }
        Ok(())
    }
}

/// Bind the axum server and start serving with the given config.
///
/// Returns a [`ServeHandle`] with the bound port and a shutdown trigger.
/// The server runs in a spawned task — call `handle.shutdown()` to stop
/// it.
pub async fn serve(config: GatewayConfig, bind: &str) -> Result<ServeHandle> {
    let state = AppState::new(config);
    let app = crate::router::router(state);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    let port = listener.local_addr()?.port();
    tracing::info!("gateway listening on {bind} (port {port})");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("received shutdown signal");
            })
            .await
    });

    Ok(ServeHandle {
        port,
        shutdown_tx: Some(shutdown_tx),
        join: Some(join),
    })
}
