//! Server startup tasks
//!
//! The listener is bound before the store is contacted. Store preparation
//! runs in the background; a failure is logged and the server keeps serving
//! (requests then fail until the store becomes reachable).

use crate::{state::AppState, Result};
use std::net::SocketAddr;
use tokio::task::JoinHandle;

/// Connect to and prepare the document store without blocking request handling.
pub fn spawn_store_connection(state: AppState, addr: SocketAddr) -> JoinHandle<Result<()>> {
    tokio::spawn(async move {
        let backend = state.store.name();
        tracing::info!(backend, "Connecting to document store...");

        match state.store.prepare().await {
            Ok(()) => {
                tracing::info!(backend, "Document store ready");
                tracing::info!("Server running on http://{}", addr);
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    backend,
                    error = %e,
                    "Failed to connect to document store; requests will fail until it is reachable"
                );
                Err(e)
            }
        }
    })
}
