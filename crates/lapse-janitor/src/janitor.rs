//! Core Janitor: wires the enumerator and deletion stages together

use crate::deletion::DeletionStage;
use crate::enumerator::EnumeratorStage;
use crate::notify::Notifier;
use crate::{ExpiryConfig, JanitorError, JanitorMetrics, StatusQuery, TaskQueue};
use lapse_domain::traits::DocumentStore;
use lapse_domain::SweepTask;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Current time in milliseconds since Unix epoch
pub(crate) fn current_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Run a synchronous store call on the blocking thread pool
pub(crate) async fn with_store<S, T, F>(store: &Arc<S>, f: F) -> Result<T, JanitorError>
where
    S: DocumentStore + Send + Sync + 'static,
    T: Send + 'static,
    F: FnOnce(&S) -> Result<T, S::Error> + Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || f(&store).map_err(|e| JanitorError::Store(e.to_string())))
        .await
        .map_err(|e| JanitorError::Worker(format!("Task join error: {}", e)))?
}

/// Sweep pipeline for document expiry
///
/// Owns the two stage queues for its whole lifetime, so their concurrency
/// bounds hold even when passes overlap.
///
/// # Examples
///
/// ```no_run
/// use lapse_janitor::{ChannelNotifier, ExpirySettings, Janitor};
/// use lapse_store::SqliteStore;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = Arc::new(SqliteStore::new("lapse.db")?);
///     let config = ExpirySettings { delay: Some(86_400), ..Default::default() }.validate()?;
///     let janitor = Janitor::new(store, config, Arc::new(ChannelNotifier::new(64)));
///
///     let submitted = janitor.sweep().await?;
///     println!("{} documents submitted", submitted);
///     Ok(())
/// }
/// ```
pub struct Janitor<S> {
    store: Arc<S>,
    config: Arc<ExpiryConfig>,
    metrics: Arc<JanitorMetrics>,
    enumerator: TaskQueue<String>,
    deletion: Arc<TaskQueue<SweepTask>>,
}

impl<S> Janitor<S>
where
    S: DocumentStore + Send + Sync + 'static,
{
    /// Create a Janitor and start its stage workers
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(store: Arc<S>, config: ExpiryConfig, notifier: Arc<dyn Notifier>) -> Self {
        let config = Arc::new(config);
        let metrics = Arc::new(JanitorMetrics::new());

        let deletion = Arc::new(
            DeletionStage::new(
                Arc::clone(&store),
                Arc::clone(&config),
                Arc::clone(&metrics),
                notifier,
            )
            .spawn(),
        );

        let enumerator = EnumeratorStage::new(
            Arc::clone(&store),
            Arc::clone(&config),
            Arc::clone(&metrics),
            Arc::clone(&deletion),
        )
        .spawn();

        Self {
            store,
            config,
            metrics,
            enumerator,
            deletion,
        }
    }

    /// Get the expiry configuration
    pub fn config(&self) -> &ExpiryConfig {
        &self.config
    }

    /// Get the shared metrics
    pub fn metrics(&self) -> &Arc<JanitorMetrics> {
        &self.metrics
    }

    /// Read-only status query over the same store and delay
    pub fn status_query(&self) -> StatusQuery<S> {
        StatusQuery::new(Arc::clone(&self.store), self.config.delay_secs())
    }

    /// Run one sweep pass
    ///
    /// Lists every document once and submits each id to the enumerator stage.
    /// Returns when all ids are submitted; evaluation and deletion continue in
    /// the background.
    pub async fn sweep(&self) -> Result<usize, JanitorError> {
        let ids = match with_store(&self.store, |s| s.list_all_document_ids()).await {
            Ok(ids) => ids,
            Err(e) => {
                self.metrics.record_list_failure();
                return Err(e);
            }
        };

        let count = ids.len();
        for id in ids {
            tracing::debug!("Pushing {} to enumerator queue", id);
            self.enumerator.push(id)?;
        }

        self.metrics.record_pass();
        Ok(count)
    }

    /// Number of documents waiting for evaluation or deletion
    pub fn pending(&self) -> usize {
        self.enumerator.pending() + self.deletion.pending()
    }

    /// Wait until both stages have drained
    pub async fn wait_idle(&self) {
        // Enumeration feeds deletion, so drain it first
        self.enumerator.wait_idle().await;
        self.deletion.wait_idle().await;
    }
}
