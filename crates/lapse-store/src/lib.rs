//! Lapse Storage Layer
//!
//! Implements the DocumentStore trait on top of SQLite.
//!
//! # Architecture
//!
//! - One `documents` table holding content, head revision and last edit time
//! - A single connection guarded by a mutex so the store can be shared between
//!   the sweep stages and the status endpoint
//!
//! # Examples
//!
//! ```no_run
//! use lapse_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! store.record_edit("meeting-notes", "Agenda", 1_700_000_000_000).unwrap();
//! ```

#![warn(missing_docs)]

use lapse_domain::traits::DocumentStore;
use lapse_domain::Document;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Document not found
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Connection mutex was poisoned by a panicking holder
    #[error("Store lock error: {0}")]
    Lock(String),
}

/// Current time in milliseconds since Unix epoch
fn current_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// SQLite-based implementation of DocumentStore
///
/// # Thread Safety
///
/// The connection is serialized behind a mutex, so a single `SqliteStore` can be
/// shared across threads (typically inside an `Arc`).
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn()?.execute_batch(schema)?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    /// Record an edit to a document, creating it if needed
    ///
    /// Each call bumps the head revision and sets the last edit time.
    /// Returns the new head revision.
    pub fn record_edit(&self, id: &str, content: &str, timestamp_ms: i64) -> Result<u64, StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO documents (id, content, head_revision, last_edit)
             VALUES (?1, ?2, 1, ?3)
             ON CONFLICT(id) DO UPDATE SET
                content = excluded.content,
                head_revision = documents.head_revision + 1,
                last_edit = excluded.last_edit",
            params![id, content, timestamp_ms],
        )?;

        let head: i64 = conn.query_row(
            "SELECT head_revision FROM documents WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Self::revision_from_sql(head)
    }

    /// Get the current content of a document
    pub fn content(&self, id: &str) -> Result<Option<String>, StoreError> {
        let content = self
            .conn()?
            .query_row(
                "SELECT content FROM documents WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(content)
    }

    fn revision_from_sql(value: i64) -> Result<u64, StoreError> {
        u64::try_from(value)
            .map_err(|_| StoreError::InvalidData(format!("Negative head revision: {}", value)))
    }

    fn load(conn: &Connection, id: &str) -> Result<Option<Document>, StoreError> {
        let row = conn
            .query_row(
                "SELECT head_revision, last_edit FROM documents WHERE id = ?1",
                params![id],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Option<i64>>(1)?)),
            )
            .optional()?;

        match row {
            Some((head, last_edit)) => Ok(Some(Document::new(
                id,
                Self::revision_from_sql(head)?,
                last_edit,
            ))),
            None => Ok(None),
        }
    }
}

impl DocumentStore for SqliteStore {
    type Error = StoreError;

    fn list_all_document_ids(&self) -> Result<Vec<String>, Self::Error> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id FROM documents ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    fn document_exists(&self, id: &str) -> Result<bool, Self::Error> {
        let exists = self
            .conn()?
            .query_row(
                "SELECT 1 FROM documents WHERE id = ?1",
                params![id],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(exists)
    }

    fn get_document(&self, id: &str, replacement_text: Option<&str>) -> Result<Document, Self::Error> {
        let conn = self.conn()?;

        if let Some(text) = replacement_text {
            conn.execute(
                "INSERT INTO documents (id, content, head_revision, last_edit)
                 VALUES (?1, ?2, 0, ?3)
                 ON CONFLICT(id) DO UPDATE SET
                    content = excluded.content,
                    head_revision = 0,
                    last_edit = excluded.last_edit",
                params![id, text, current_millis()],
            )?;
            tracing::debug!("Document {} reset to replacement text", id);
        }

        Self::load(&conn, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn remove_document(&self, id: &str) -> Result<bool, Self::Error> {
        let removed = self
            .conn()?
            .execute("DELETE FROM documents WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }
}
