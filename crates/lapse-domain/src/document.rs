//! Document module - activity snapshots handed out by the store

/// Snapshot of a document's activity metadata
///
/// The store owns the document; this value is only borrowed for a single
/// evaluation and never cached across sweep passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Document identifier
    pub id: String,

    /// Head revision number (0 means the document was never edited)
    pub head_revision: u64,

    /// Last edit time in milliseconds since Unix epoch
    pub last_edit: Option<i64>,
}

impl Document {
    /// Create a snapshot
    pub fn new(id: impl Into<String>, head_revision: u64, last_edit: Option<i64>) -> Self {
        Self {
            id: id.into(),
            head_revision,
            last_edit,
        }
    }

    /// Head revision number of the document
    pub fn head_revision_number(&self) -> u64 {
        self.head_revision
    }

    /// Timestamp of the last edit, if the store knows it
    pub fn last_edit_timestamp(&self) -> Option<i64> {
        self.last_edit
    }

    /// Whether the document has never been edited
    ///
    /// # Examples
    ///
    /// ```
    /// use lapse_domain::Document;
    ///
    /// assert!(Document::new("fresh", 0, Some(1_000)).is_new());
    /// assert!(!Document::new("used", 4, Some(1_000)).is_new());
    /// ```
    pub fn is_new(&self) -> bool {
        self.head_revision == 0
    }
}

/// A document judged expired, waiting for the deletion stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepTask {
    /// Identifier of the expired document
    pub document_id: String,

    /// Last edit timestamp that made it eligible (ms since epoch)
    pub last_edit: i64,
}

impl SweepTask {
    /// Create a sweep task for an expired document
    pub fn new(document_id: impl Into<String>, last_edit: i64) -> Self {
        Self {
            document_id: document_id.into(),
            last_edit,
        }
    }
}
