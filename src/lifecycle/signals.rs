//! OS signal handling.

use tokio::sync::broadcast;

/// Resolve on Ctrl+C. Never resolves if the handler cannot be installed.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Resolve on Ctrl+C or when the coordinator fires, whichever comes first.
pub async fn shutdown_requested(mut rx: broadcast::Receiver<()>) {
    tokio::select! {
        _ = ctrl_c() => {}
        _ = rx.recv() => {
            tracing::info!("Shutdown requested");
        }
    }
}
