//! Status query: remaining TTL of a single document
//!
//! A pure read over the store. It never queues deletion work and never
//! mutates a document, so it can run alongside an in-progress sweep.

use crate::janitor::{current_millis, with_store};
use crate::JanitorError;
use lapse_domain::traits::DocumentStore;
use lapse_domain::{compute_ttl, TtlReason, TtlResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Message reported for an id with no stored document
pub const EMPTY_DOCUMENT_MSG: &str = "Empty document";

/// Message reported for a document expiry does not apply to
pub const NEW_DOCUMENT_MSG: &str = "New or empty document";

/// Outcome of a status query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusResult {
    /// The store has no document under this id
    NoSuchDocument,

    /// TTL of an existing document
    Ttl(TtlResult),
}

/// Wire body of a TTL lookup, shared by the HTTP service and its clients
///
/// Serializes to `{"ttl": <seconds>}` or `{"ttl": null, "msg": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtlResponse {
    /// Seconds until expiry; may be zero or negative if not yet swept
    pub ttl: Option<i64>,
    /// Explanation when `ttl` is null
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl From<StatusResult> for TtlResponse {
    fn from(result: StatusResult) -> Self {
        match result {
            StatusResult::NoSuchDocument => TtlResponse {
                ttl: None,
                msg: Some(EMPTY_DOCUMENT_MSG.to_string()),
            },
            StatusResult::Ttl(ttl) if ttl.reason == TtlReason::NewOrEmpty => TtlResponse {
                ttl: None,
                msg: Some(NEW_DOCUMENT_MSG.to_string()),
            },
            StatusResult::Ttl(ttl) => TtlResponse {
                ttl: ttl.ttl_seconds,
                msg: None,
            },
        }
    }
}

/// Per-document TTL lookup
pub struct StatusQuery<S> {
    store: Arc<S>,
    delay_secs: u64,
}

impl<S> Clone for StatusQuery<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            delay_secs: self.delay_secs,
        }
    }
}

impl<S> StatusQuery<S>
where
    S: DocumentStore + Send + Sync + 'static,
{
    /// Create a query over `store` using the configured delay
    pub fn new(store: Arc<S>, delay_secs: u64) -> Self {
        Self { store, delay_secs }
    }

    /// Compute the document's TTL as of now
    pub async fn query(&self, document_id: &str) -> Result<StatusResult, JanitorError> {
        self.query_at(document_id, current_millis()).await
    }

    /// Compute the document's TTL as of `now_ms`
    pub async fn query_at(&self, document_id: &str, now_ms: i64) -> Result<StatusResult, JanitorError> {
        let id = document_id.to_string();
        let document = with_store(&self.store, move |s| {
            if !s.document_exists(&id)? {
                return Ok(None);
            }
            s.get_document(&id, None).map(Some)
        })
        .await?;

        Ok(match document {
            Some(document) => StatusResult::Ttl(compute_ttl(&document, now_ms, self.delay_secs)),
            None => StatusResult::NoSuchDocument,
        })
    }
}
