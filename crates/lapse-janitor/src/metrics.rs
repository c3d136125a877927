//! Metrics collection for sweep operations
//!
//! Counters are atomics so the scheduler, both stages and the status endpoint
//! can share one instance without locking.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by the sweep pipeline
#[derive(Debug, Default)]
pub struct JanitorMetrics {
    passes: AtomicU64,
    list_failures: AtomicU64,
    evaluated: AtomicU64,
    skipped_new: AtomicU64,
    skipped_active: AtomicU64,
    fetch_failures: AtomicU64,
    enqueued: AtomicU64,
    deleted: AtomicU64,
    deletion_failures: AtomicU64,
    notified: AtomicU64,
}

/// Point-in-time copy of [`JanitorMetrics`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Sweep passes whose submission phase completed
    pub passes: u64,
    /// Passes that could not list the store
    pub list_failures: u64,
    /// Documents evaluated by the enumerator stage
    pub evaluated: u64,
    /// Documents skipped because they were never edited
    pub skipped_new: u64,
    /// Documents skipped because they are still within the delay
    pub skipped_active: u64,
    /// Documents whose metadata could not be fetched
    pub fetch_failures: u64,
    /// Expired documents handed to the deletion stage
    pub enqueued: u64,
    /// Documents expired and replaced by a placeholder
    pub deleted: u64,
    /// Deletion tasks dropped after a store failure
    pub deletion_failures: u64,
    /// Reconnect notifications accepted by the notifier
    pub notified: u64,
}

impl JanitorMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed pass submission
    pub fn record_pass(&self) {
        Self::bump(&self.passes);
    }

    /// Record a pass that failed to list documents
    pub fn record_list_failure(&self) {
        Self::bump(&self.list_failures);
    }

    /// Record one document evaluation
    pub fn record_evaluated(&self) {
        Self::bump(&self.evaluated);
    }

    /// Record a never-edited document
    pub fn record_skipped_new(&self) {
        Self::bump(&self.skipped_new);
    }

    /// Record a document still within its delay
    pub fn record_skipped_active(&self) {
        Self::bump(&self.skipped_active);
    }

    /// Record a metadata fetch failure
    pub fn record_fetch_failure(&self) {
        Self::bump(&self.fetch_failures);
    }

    /// Record a task handed to the deletion stage
    pub fn record_enqueued(&self) {
        Self::bump(&self.enqueued);
    }

    /// Record a completed expiry
    pub fn record_deleted(&self) {
        Self::bump(&self.deleted);
    }

    /// Record a dropped deletion task
    pub fn record_deletion_failure(&self) {
        Self::bump(&self.deletion_failures);
    }

    /// Record a reconnect notification
    pub fn record_notified(&self) {
        Self::bump(&self.notified);
    }

    /// Copy the current counter values
    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        MetricsSnapshot {
            passes: load(&self.passes),
            list_failures: load(&self.list_failures),
            evaluated: load(&self.evaluated),
            skipped_new: load(&self.skipped_new),
            skipped_active: load(&self.skipped_active),
            fetch_failures: load(&self.fetch_failures),
            enqueued: load(&self.enqueued),
            deleted: load(&self.deleted),
            deletion_failures: load(&self.deletion_failures),
            notified: load(&self.notified),
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        for counter in [
            &self.passes,
            &self.list_failures,
            &self.evaluated,
            &self.skipped_new,
            &self.skipped_active,
            &self.fetch_failures,
            &self.enqueued,
            &self.deleted,
            &self.deletion_failures,
            &self.notified,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl MetricsSnapshot {
    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Sweep Metrics Summary".to_string(),
            "=====================".to_string(),
            format!("Sweep passes: {}", self.passes),
            format!("List failures: {}", self.list_failures),
            String::new(),
            "Enumeration:".to_string(),
            format!("  Evaluated: {}", self.evaluated),
            format!("  New or empty: {}", self.skipped_new),
            format!("  Active: {}", self.skipped_active),
            format!("  Fetch failures: {}", self.fetch_failures),
            format!("  Expired: {}", self.enqueued),
        ];

        if self.enqueued > 0 || self.deletion_failures > 0 {
            lines.push(String::new());
            lines.push("Deletion:".to_string());
            lines.push(format!("  Deleted: {}", self.deleted));
            lines.push(format!("  Failures: {}", self.deletion_failures));
            lines.push(format!("  Reconnects sent: {}", self.notified));
        }

        lines.join("\n")
    }
}
