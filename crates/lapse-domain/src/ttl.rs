//! TTL computation - remaining lifetime of an idle document
//!
//! Shared by the sweep (to decide eligibility) and by the status query (to
//! report the countdown). Remaining time is floored to whole seconds toward
//! negative infinity and is deliberately not clamped: a document that is past
//! its delay but not yet swept reports a negative TTL.

use crate::Document;

/// Why a TTL has (or lacks) a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TtlReason {
    /// Never edited, or no last-edit timestamp: expiry does not apply
    NewOrEmpty,

    /// Idle for longer than the delay
    Expired,

    /// Still within the delay
    Active,
}

impl TtlReason {
    /// Get the reason as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TtlReason::NewOrEmpty => "new-or-empty",
            TtlReason::Expired => "expired",
            TtlReason::Active => "active",
        }
    }
}

/// Result of a TTL computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlResult {
    /// Seconds remaining before expiry; `None` when expiry does not apply
    pub ttl_seconds: Option<i64>,

    /// Classification of the document
    pub reason: TtlReason,
}

impl TtlResult {
    /// Result for a document that expiry does not apply to
    pub fn new_or_empty() -> Self {
        Self {
            ttl_seconds: None,
            reason: TtlReason::NewOrEmpty,
        }
    }

    /// Whether the document is eligible for deletion
    pub fn is_expired(&self) -> bool {
        self.reason == TtlReason::Expired
    }
}

/// Compute the remaining TTL of a document
///
/// `now_ms` is milliseconds since Unix epoch, `delay_secs` the configured idle
/// delay. A document is expired once `now - last_edit` is strictly greater
/// than the delay.
///
/// # Examples
///
/// ```
/// use lapse_domain::{compute_ttl, Document, TtlReason};
///
/// let now = 10_000_000;
/// let doc = Document::new("notes", 3, Some(now - 1_800_000));
/// let ttl = compute_ttl(&doc, now, 3600);
/// assert_eq!(ttl.ttl_seconds, Some(1800));
/// assert_eq!(ttl.reason, TtlReason::Active);
/// ```
pub fn compute_ttl(document: &Document, now_ms: i64, delay_secs: u64) -> TtlResult {
    let last_edit = match document.last_edit {
        Some(ts) if !document.is_new() => ts,
        _ => return TtlResult::new_or_empty(),
    };

    let delay_ms = i64::try_from(delay_secs)
        .unwrap_or(i64::MAX)
        .saturating_mul(1000);
    let elapsed_ms = now_ms.saturating_sub(last_edit);
    let remaining_ms = delay_ms.saturating_sub(elapsed_ms);

    let reason = if elapsed_ms > delay_ms {
        TtlReason::Expired
    } else {
        TtlReason::Active
    };

    TtlResult {
        ttl_seconds: Some(remaining_ms.div_euclid(1000)),
        reason,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const NOW: i64 = 1_700_000_000_000;

    proptest! {
        /// Property: TTL never increases as idle time grows
        #[test]
        fn test_ttl_monotonically_decreasing(
            a in 0i64..1_000_000_000,
            b in 0i64..1_000_000_000,
            delay in 1u64..10_000_000,
        ) {
            let (short, long) = if a <= b { (a, b) } else { (b, a) };
            let fresh = compute_ttl(&Document::new("d", 1, Some(NOW - short)), NOW, delay);
            let stale = compute_ttl(&Document::new("d", 1, Some(NOW - long)), NOW, delay);
            prop_assert!(fresh.ttl_seconds >= stale.ttl_seconds);
        }

        /// Property: expired exactly when elapsed time exceeds the delay
        #[test]
        fn test_expiry_threshold(
            elapsed_ms in 0i64..1_000_000_000,
            delay in 1u64..1_000_000,
        ) {
            let doc = Document::new("d", 1, Some(NOW - elapsed_ms));
            let ttl = compute_ttl(&doc, NOW, delay);
            prop_assert_eq!(ttl.is_expired(), elapsed_ms > delay as i64 * 1000);
            prop_assert!(ttl.ttl_seconds.is_some());
        }

        /// Property: unedited documents never get a TTL
        #[test]
        fn test_new_documents_have_no_ttl(ts in proptest::option::of(0i64..NOW), delay in 1u64..1_000_000) {
            let ttl = compute_ttl(&Document::new("d", 0, ts), NOW, delay);
            prop_assert_eq!(ttl, TtlResult::new_or_empty());
        }
    }
}
