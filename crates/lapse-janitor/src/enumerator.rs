//! Enumerator stage: decides which documents are expired
//!
//! Runs with a single worker so the whole corpus is read one document at a
//! time. Expired documents are pushed to the deletion stage without waiting
//! for them to be processed.

use crate::janitor::{current_millis, with_store};
use crate::{ExpiryConfig, JanitorMetrics, TaskQueue};
use lapse_domain::traits::DocumentStore;
use lapse_domain::{compute_ttl, SweepTask, TtlReason};
use std::sync::Arc;

/// Number of documents evaluated concurrently
pub const ENUMERATOR_WIDTH: usize = 1;

pub(crate) struct EnumeratorStage<S> {
    store: Arc<S>,
    config: Arc<ExpiryConfig>,
    metrics: Arc<JanitorMetrics>,
    deletion: Arc<TaskQueue<SweepTask>>,
}

impl<S> EnumeratorStage<S>
where
    S: DocumentStore + Send + Sync + 'static,
{
    pub(crate) fn new(
        store: Arc<S>,
        config: Arc<ExpiryConfig>,
        metrics: Arc<JanitorMetrics>,
        deletion: Arc<TaskQueue<SweepTask>>,
    ) -> Self {
        Self {
            store,
            config,
            metrics,
            deletion,
        }
    }

    /// Start the stage's worker pool
    pub(crate) fn spawn(self) -> TaskQueue<String> {
        let stage = Arc::new(self);
        TaskQueue::spawn("enumerator", ENUMERATOR_WIDTH, move |document_id: String| {
            let stage = Arc::clone(&stage);
            async move { stage.evaluate(document_id).await }
        })
    }

    /// Evaluate one document; never fails so the queue always advances
    pub(crate) async fn evaluate(&self, document_id: String) {
        self.metrics.record_evaluated();

        let id = document_id.clone();
        let document = match with_store(&self.store, move |s| s.get_document(&id, None)).await {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Skipping document {}: {}", document_id, e);
                self.metrics.record_fetch_failure();
                return;
            }
        };

        if document.is_new() {
            tracing::debug!("New or empty document {}", document_id);
            self.metrics.record_skipped_new();
            return;
        }

        let ttl = compute_ttl(&document, current_millis(), self.config.delay_secs());
        match (ttl.reason, document.last_edit) {
            (TtlReason::Expired, Some(last_edit)) => {
                tracing::debug!("Pushing {} to deletion queue", document_id);
                match self.deletion.push(SweepTask::new(document_id, last_edit)) {
                    Ok(()) => self.metrics.record_enqueued(),
                    Err(e) => tracing::error!("Could not queue expired document: {}", e),
                }
            }
            (TtlReason::NewOrEmpty, _) => {
                tracing::debug!("Document {} has no last edit time", document_id);
                self.metrics.record_skipped_new();
            }
            _ => {
                tracing::debug!("Nothing to do with {} (not expired)", document_id);
                self.metrics.record_skipped_active();
            }
        }
    }
}
