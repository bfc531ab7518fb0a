//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the route table for the configured revision
//! - Bind the listener
//!
//! # Design Decisions
//! - Any startup error is fatal
//! - The listener binds last, so traffic only arrives once routing is ready

use thiserror::Error;
use tokio::net::TcpListener;

use crate::app;
use crate::config::DevServerConfig;
use crate::routing::{RouteTable, Router, TableError};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("route table revision {0} does not exist")]
    UnknownSnapshot(u8),

    #[error("route table is invalid: {0}")]
    Table(#[from] TableError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Build the resolver for a route table revision.
pub fn build_router(snapshot: u8) -> Result<Router, StartupError> {
    let specs = app::snapshot(snapshot).ok_or(StartupError::UnknownSnapshot(snapshot))?;
    let table = RouteTable::from_specs(specs)?;

    tracing::info!(snapshot, routes = table.len(), "Route table built");
    Ok(Router::new(table))
}

/// Bind the dev server listener.
pub async fn bind_listener(config: &DevServerConfig) -> Result<TcpListener, StartupError> {
    let address = config.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    if let Ok(local_addr) = listener.local_addr() {
        tracing::info!(address = %local_addr, "Listening for connections");
    }
    Ok(listener)
}
