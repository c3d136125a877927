//! Lapse Janitor
//!
//! Background sweep that expires idle documents, plus the read path that
//! reports how long a document has left.
//!
//! # Overview
//!
//! The Janitor is responsible for:
//! - **Enumeration**: walking every document id and deciding whether it expired
//! - **Expiry**: removing expired content, writing a placeholder, and asking
//!   collaborators to reconnect
//! - **Scheduling**: a startup pass and a self-rescheduling timer chain
//! - **Status**: per-document TTL lookups sharing the same computation
//!
//! # Architecture
//!
//! ```text
//! SweepScheduler ──ids──▶ enumerator (1 worker) ──SweepTask──▶ deletion (2 workers)
//!                                                              │
//!                                                              ├─ remove + placeholder
//!                                                              └─ reconnect broadcast
//! StatusQuery ──▶ store (read only)
//! ```
//!
//! Store calls are synchronous and run on tokio's blocking pool. Enumeration
//! never waits for deletion, so passes may overlap with deletions left over
//! from an earlier pass.
//!
//! # Usage
//!
//! ## One-time Sweep
//!
//! ```no_run
//! use lapse_janitor::{ChannelNotifier, ExpirySettings, Janitor};
//! use lapse_store::SqliteStore;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(SqliteStore::new("lapse.db")?);
//! let config = ExpirySettings { delay: Some(3600), ..Default::default() }.validate()?;
//! let janitor = Janitor::new(store, config, Arc::new(ChannelNotifier::new(64)));
//!
//! janitor.sweep().await?;
//! janitor.wait_idle().await;
//! println!("{}", janitor.metrics().snapshot().summary());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [delete_after_delay]
//! delay = 86400          # required, seconds
//! loop = true
//! loop_delay = 3600      # also accepted as loopDelay
//! delete_at_start = true # also accepted as deleteAtStart
//! text = "This document expired."
//! ```

#![warn(missing_docs)]

mod config;
mod deletion;
mod enumerator;
mod error;
mod janitor;
mod metrics;
pub mod notify;
mod queue;
mod scheduler;
mod status;

pub use config::{ExpiryConfig, ExpirySettings, DEFAULT_REPLACEMENT_TEXT};
pub use deletion::DELETION_WIDTH;
pub use enumerator::ENUMERATOR_WIDTH;
pub use error::JanitorError;
pub use janitor::Janitor;
pub use metrics::{JanitorMetrics, MetricsSnapshot};
pub use notify::{ChannelNotifier, Notifier, NotifyError, ReconnectMessage};
pub use queue::TaskQueue;
pub use scheduler::SweepScheduler;
pub use status::{StatusQuery, StatusResult, TtlResponse, EMPTY_DOCUMENT_MSG, NEW_DOCUMENT_MSG};
