//! Lapse Domain Layer
//!
//! Core model and pure logic for document expiry. It has ZERO external
//! dependencies and defines the document snapshot, the time-to-live
//! computation, and the trait boundary that store adapters implement.
//!
//! ## Key Concepts
//!
//! - **Document**: a transient snapshot of a stored document's activity metadata
//! - **TTL**: seconds remaining before an idle document becomes expired
//! - **Sweep task**: one expired document handed to the deletion stage

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod traits;
pub mod ttl;

// Re-exports for convenience
pub use document::{Document, SweepTask};
pub use traits::DocumentStore;
pub use ttl::{compute_ttl, TtlReason, TtlResult};
