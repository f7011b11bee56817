//! Key-value document persistence.
//!
//! Every collection is one serialized document under one key, and every
//! mutation rewrites the whole document. There are no partial-field updates.
//!
//! Stores take `&self` on both reads and writes: all core mutations happen on
//! a single logical execution context, so implementations use interior
//! mutability where they need it and one store instance can be shared by
//! handle between the ledger and the collections.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Document key for the site limit ledger.
pub const SITE_LIMITS_KEY: &str = "focusr_site_limits";
/// Document key for browsing history.
pub const HISTORY_KEY: &str = "focusr_history";
/// Document key for bookmarks.
pub const BOOKMARKS_KEY: &str = "focusr_bookmarks";
/// Document key for notes.
pub const NOTES_KEY: &str = "focusr_notes";
/// Document key for saved browsing sessions.
pub const SESSIONS_KEY: &str = "focusr_sessions";

/// Errors reading or writing persisted documents.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The backing store rejected the operation.
    #[error("store error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The document could not be serialized.
    #[error("failed to encode document {key}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A persistent key-value store of serialized documents.
pub trait DocumentStore {
    /// Returns the document stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Replaces the document stored under `key`.
    ///
    /// Implementations must make each call atomic.
    fn set(&self, key: &str, document: &str) -> Result<(), PersistenceError>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, document: &str) -> Result<(), PersistenceError> {
        (**self).set(key, document)
    }
}

impl<S: DocumentStore + ?Sized> DocumentStore for Rc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, document: &str) -> Result<(), PersistenceError> {
        (**self).set(key, document)
    }
}

/// Loads and decodes a document.
///
/// Returns `None` when the key is absent, unreadable, or fails to decode, so
/// callers fall back to their default collection instead of failing startup.
pub fn load_document<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: DocumentStore + ?Sized,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!(key, error = %err, "failed to read document, using defaults");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, error = %err, "failed to decode document, using defaults");
            None
        }
    }
}

/// Encodes and writes a document, replacing any previous value.
pub fn save_document<T, S>(store: &S, key: &str, value: &T) -> Result<(), PersistenceError>
where
    T: Serialize + ?Sized,
    S: DocumentStore + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| PersistenceError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}

/// Error returned by [`MemoryStore`] while writes are failing.
#[derive(Debug, Error)]
#[error("writes are disabled")]
pub struct WritesDisabled;

/// In-process store backed by a map.
///
/// Writes can be switched off to exercise persistence failure handling.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RefCell<BTreeMap<String, String>>,
    fail_writes: Cell<bool>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent `set` calls fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Returns the raw document under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.documents.borrow().get(key).cloned()
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.documents.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, document: &str) -> Result<(), PersistenceError> {
        if self.fail_writes.get() {
            return Err(PersistenceError::Backend(Box::new(WritesDisabled)));
        }
        self.documents
            .borrow_mut()
            .insert(key.to_string(), document.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
