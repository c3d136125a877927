//! Trait definitions for external interactions
//!
//! The document store lives outside this workspace's core; adapters such as
//! `lapse-store` implement this trait.

use crate::Document;

/// Trait for the document store the sweep runs against
///
/// Calls are synchronous. Callers that run on an async runtime are expected to
/// move them onto a blocking thread.
pub trait DocumentStore {
    /// Error type for store operations, reported in logs by the sweep
    type Error: std::fmt::Display;

    /// List the identifiers of every stored document
    fn list_all_document_ids(&self) -> Result<Vec<String>, Self::Error>;

    /// Check whether a document exists
    fn document_exists(&self, id: &str) -> Result<bool, Self::Error>;

    /// Fetch a document snapshot
    ///
    /// With `replacement_text` set, the document is created (or its content
    /// reset) with that text before the snapshot is taken; the result has
    /// head revision 0.
    fn get_document(&self, id: &str, replacement_text: Option<&str>) -> Result<Document, Self::Error>;

    /// Irreversibly remove a document
    ///
    /// Returns `false` if there was nothing to remove.
    fn remove_document(&self, id: &str) -> Result<bool, Self::Error>;
}
