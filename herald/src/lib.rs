//! Service wiring for the campaign dispatcher.
//!
//! Builds the store, delivery stack, and engine from a [`Config`] and
//! runs the campaign watcher until a shutdown signal arrives.

pub mod config;

use std::sync::Arc;

use herald_common::Signal;
use herald_delivery::TransportError;
use herald_engine::{CampaignWatcher, ControlMonitor, DispatchEngine};
use herald_store::StoreError;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{error, info};

pub use crate::config::{Config, ConfigError};

/// Errors raised while assembling or running the service.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Run the dispatcher until ctrl-c.
///
/// In-flight campaign runs are drained after the signal: the watcher
/// stops claiming new campaigns but waits for claimed ones to reach a
/// terminal state, so every processed recipient is checkpointed.
///
/// # Errors
/// If the store backend or the HTTP transport cannot be constructed.
pub async fn serve(config: Config) -> Result<(), ServeError> {
    let store = config.store.into_store()?;
    let delivery = config.delivery.into_controller()?;
    let monitor = ControlMonitor::new(store.clone(), config.engine.poll_interval());
    let engine = Arc::new(DispatchEngine::new(store.clone(), delivery, monitor));
    let watcher = CampaignWatcher::new(store, engine, config.engine.scan_interval());

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, shutting down");
                let _ = shutdown_tx.send(Signal::Shutdown);
            }
            Err(e) => error!(error = %e, "Failed to listen for interrupt"),
        }
    });

    watcher.run(shutdown_rx).await;
    info!("Shutdown complete");

    Ok(())
}
