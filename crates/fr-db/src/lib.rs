//! Storage layer for Focusr.
//!
//! Provides a SQLite-backed [`DocumentStore`] using `rusqlite`.
//!
//! # Thread Safety
//!
//! [`SqliteStore`] wraps a `rusqlite::Connection`, which is `Send` but not
//! `Sync`. All core mutations happen on one logical execution context, so a
//! store is owned by the application root and shared by `Rc` handle. A host
//! with several threads must marshal calls onto that context.
//!
//! # Schema
//!
//! One row per document key. The value column holds the whole serialized
//! document; every write replaces it in a single statement, so each `set` is
//! atomic and a reader never sees a partially written document.
//!
//! Timestamps are stored as TEXT in RFC 3339 format (e.g.
//! `2025-01-15T10:30:00Z`), always UTC.

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use fr_core::store::{DocumentStore, PersistenceError};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl From<DbError> for PersistenceError {
    fn from(err: DbError) -> Self {
        Self::Backend(Box::new(err))
    }
}

/// Metadata for one stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub key: String,
    pub bytes: usize,
    pub updated_at: String,
}

/// SQLite document store.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init()?;
        tracing::debug!(path = %path.display(), "opened document store");
        Ok(store)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The data is gone when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    /// Initializes the schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- Whole serialized documents keyed by collection name
            -- updated_at: RFC 3339, UTC
            CREATE TABLE IF NOT EXISTS documents (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Reads one document.
    pub fn get_document(&self, key: &str) -> Result<Option<String>, DbError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM documents WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Replaces one document.
    pub fn put_document(&self, key: &str, value: &str) -> Result<(), DbError> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        self.conn.execute(
            "
            INSERT INTO documents (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
            params![key, value, now],
        )?;
        tracing::trace!(key, bytes = value.len(), "document written");
        Ok(())
    }

    /// Lists stored documents, ordered by key.
    pub fn documents(&self) -> Result<Vec<DocumentInfo>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, length(CAST(value AS BLOB)), updated_at FROM documents ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            let bytes: i64 = row.get(1)?;
            Ok(DocumentInfo {
                key: row.get(0)?,
                bytes: usize::try_from(bytes).unwrap_or(0),
                updated_at: row.get(2)?,
            })
        })?;
        let docs = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(docs)
    }
}

impl DocumentStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.get_document(key)?)
    }

    fn set(&self, key: &str, document: &str) -> Result<(), PersistenceError> {
        Ok(self.put_document(key, document)?)
    }
}
