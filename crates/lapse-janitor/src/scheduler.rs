//! Sweep scheduler for continuous Janitor operation

use crate::Janitor;
use lapse_domain::traits::DocumentStore;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Drives sweep passes: optionally one at startup, then a self-rescheduling
/// chain of one-shot timers
///
/// The next timer is armed only after the current pass has submitted all of
/// its ids, so a slow listing defers the next pass instead of overlapping it.
///
/// # Examples
///
/// ```no_run
/// use lapse_janitor::{ChannelNotifier, ExpirySettings, Janitor, SweepScheduler};
/// use lapse_store::SqliteStore;
/// use std::sync::Arc;
/// use tokio::sync::broadcast;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = Arc::new(SqliteStore::new("lapse.db")?);
///     let config = ExpirySettings { delay: Some(86_400), ..Default::default() }.validate()?;
///     let janitor = Arc::new(Janitor::new(store, config, Arc::new(ChannelNotifier::new(64))));
///
///     let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
///     let scheduler = SweepScheduler::new(janitor);
///     let handle = tokio::spawn(async move { scheduler.run(shutdown_rx).await });
///
///     tokio::signal::ctrl_c().await?;
///     shutdown_tx.send(())?;
///     handle.await?;
///     Ok(())
/// }
/// ```
pub struct SweepScheduler<S> {
    janitor: Arc<Janitor<S>>,
}

impl<S> SweepScheduler<S>
where
    S: DocumentStore + Send + Sync + 'static,
{
    /// Create a scheduler for the given Janitor
    pub fn new(janitor: Arc<Janitor<S>>) -> Self {
        Self { janitor }
    }

    /// Run until a shutdown signal is received
    ///
    /// With `loop` disabled this returns right after the startup pass (if
    /// any). Dropping every shutdown sender also stops the chain.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        let config = self.janitor.config();

        tracing::info!(
            "Sweep scheduler started (delay: {}s, loop: {}, loop delay: {:?}, at start: {})",
            config.delay_secs(),
            config.loop_enabled(),
            config.loop_delay(),
            config.delete_at_start()
        );

        if config.delete_at_start() {
            self.pass().await;
        }

        if !config.loop_enabled() {
            tracing::info!("Sweep loop disabled, no further passes scheduled");
            return;
        }

        loop {
            tokio::select! {
                _ = tokio::time::sleep(config.loop_delay()) => {
                    tracing::info!("New loop");
                    self.pass().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, stopping sweep scheduler");
                    break;
                }
            }
        }

        let metrics = self.janitor.metrics().snapshot();
        tracing::info!("Sweep scheduler stopped. Final metrics:\n{}", metrics.summary());
    }

    /// Run the startup pass (if enabled) and then `cycles` timed passes
    ///
    /// Ignores the `loop` flag. Returns the number of passes attempted.
    pub async fn run_cycles(&self, cycles: usize) -> usize {
        let config = self.janitor.config();
        let mut passes = 0;

        if config.delete_at_start() {
            self.pass().await;
            passes += 1;
        }

        for cycle in 0..cycles {
            tokio::time::sleep(config.loop_delay()).await;
            tracing::debug!("Starting sweep cycle {}/{}", cycle + 1, cycles);
            self.pass().await;
            passes += 1;
        }

        passes
    }

    /// One pass; failures are logged and never end the chain
    async fn pass(&self) {
        match self.janitor.sweep().await {
            Ok(submitted) => {
                tracing::info!("Sweep pass submitted {} documents", submitted);
                tracing::debug!("{}", self.janitor.metrics().snapshot().summary());
            }
            Err(e) => {
                tracing::error!("Sweep pass failed: {}", e);
            }
        }
    }
}
