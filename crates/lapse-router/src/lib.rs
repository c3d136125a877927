//! Lapse Router
//!
//! HTTP front end for document expiry. Hosts the sweep scheduler in the
//! background and serves per-document TTL lookups to client pollers.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::RouterConfig;
use handlers::{create_router, AppState};
use lapse_janitor::{ChannelNotifier, Janitor, SweepScheduler};
use lapse_store::{SqliteStore, StoreError};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{error, info};

/// Buffered reconnect messages per notification subscriber
const NOTIFICATION_CAPACITY: usize = 1024;

/// Router error
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Document store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Validate the expiry section and, if valid, start the sweep in the background
///
/// An invalid or missing section is logged once and leaves the feature
/// disabled; the returned state then answers TTL lookups with 503.
pub fn start_expiry(
    store: Arc<SqliteStore>,
    config: &RouterConfig,
    shutdown: broadcast::Receiver<()>,
) -> AppState {
    let expiry = match config.expiry() {
        Ok(expiry) => expiry,
        Err(e) => {
            error!("{}; document expiry is disabled", e);
            return AppState::disabled(e.to_string());
        }
    };

    let notifier = ChannelNotifier::new(NOTIFICATION_CAPACITY);
    spawn_notification_relay(notifier.subscribe());

    let janitor = Arc::new(Janitor::new(store, expiry, Arc::new(notifier)));
    let state = AppState::enabled(janitor.status_query(), Arc::clone(janitor.metrics()));

    let scheduler = SweepScheduler::new(janitor);
    tokio::spawn(async move { scheduler.run(shutdown).await });

    state
}

/// Log every reconnect request handed to the notifier
fn spawn_notification_relay(mut messages: broadcast::Receiver<lapse_janitor::ReconnectMessage>) {
    tokio::spawn(async move {
        loop {
            match messages.recv().await {
                Ok(message) => match message.to_json() {
                    Ok(json) => info!("Reconnect requested for {}: {}", message.document_id(), json),
                    Err(e) => tracing::trace!("Unencodable reconnect message: {}", e),
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!("Notification relay skipped {} messages", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

/// Start the Router HTTP server
///
/// Opens the document store, starts the sweep (if configured) and serves
/// until Ctrl+C.
pub async fn start_server(config: RouterConfig) -> Result<(), RouterError> {
    info!("Starting Lapse Router");
    info!("Bind address: {}", config.bind_addr());
    info!("Database: {}", config.database_path);

    let store = Arc::new(SqliteStore::new(&config.database_path)?);

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let state = start_expiry(store, &config, shutdown_rx);

    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Router listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received");
            // Scheduler may already be gone when expiry is disabled
            let _ = shutdown_tx.send(());
        })
        .await
        .map_err(|e| RouterError::Server(e.to_string()))?;

    Ok(())
}
