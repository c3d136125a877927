//! Deletion stage: expires documents
//!
//! Each task removes the document, recreates it with the placeholder text and
//! asks connected collaborators to reconnect. A failing task is logged and
//! dropped; the next pass re-evaluates the document if it is still there.

use crate::janitor::with_store;
use crate::notify::{Notifier, ReconnectMessage};
use crate::{ExpiryConfig, JanitorError, JanitorMetrics, TaskQueue};
use lapse_domain::traits::DocumentStore;
use lapse_domain::SweepTask;
use std::sync::Arc;

/// Number of documents expired concurrently
pub const DELETION_WIDTH: usize = 2;

pub(crate) struct DeletionStage<S> {
    store: Arc<S>,
    config: Arc<ExpiryConfig>,
    metrics: Arc<JanitorMetrics>,
    notifier: Arc<dyn Notifier>,
}

impl<S> DeletionStage<S>
where
    S: DocumentStore + Send + Sync + 'static,
{
    pub(crate) fn new(
        store: Arc<S>,
        config: Arc<ExpiryConfig>,
        metrics: Arc<JanitorMetrics>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            config,
            metrics,
            notifier,
        }
    }

    /// Start the stage's worker pool
    pub(crate) fn spawn(self) -> TaskQueue<SweepTask> {
        let stage = Arc::new(self);
        TaskQueue::spawn("deletion", DELETION_WIDTH, move |task: SweepTask| {
            let stage = Arc::clone(&stage);
            async move {
                let document_id = task.document_id.clone();
                if let Err(e) = stage.expire(task).await {
                    tracing::error!("Failed to expire document {}: {}", document_id, e);
                    stage.metrics.record_deletion_failure();
                }
            }
        })
    }

    /// Remove, recreate and announce one expired document
    pub(crate) async fn expire(&self, task: SweepTask) -> Result<(), JanitorError> {
        let id = task.document_id.clone();
        let removed = with_store(&self.store, move |s| s.remove_document(&id)).await?;
        if !removed {
            tracing::debug!("Document {} was already gone", task.document_id);
        }

        let id = task.document_id.clone();
        let text = self.config.replacement_text().to_string();
        with_store(&self.store, move |s| s.get_document(&id, Some(&text))).await?;

        let message = ReconnectMessage::request_reconnect(task.document_id.as_str());
        match self.notifier.broadcast(&message) {
            Ok(()) => self.metrics.record_notified(),
            Err(e) => tracing::trace!("Reconnect for {} not delivered: {}", task.document_id, e),
        }

        tracing::info!(
            "Document {} deleted since expired (delay: {} seconds, last edition: {})",
            task.document_id,
            self.config.delay_secs(),
            task.last_edit
        );
        self.metrics.record_deleted();

        Ok(())
    }
}
