//! Browsing history, bookmarks, notes, and saved sessions.
//!
//! Each collection is one document in the store. As with the ledger, changes
//! land in memory first and a failed write is returned without rolling back.

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::store::{
    BOOKMARKS_KEY, DocumentStore, HISTORY_KEY, NOTES_KEY, PersistenceError, SESSIONS_KEY,
    load_document, save_document,
};
use crate::types::{BookmarkId, HistoryId, NoteId, SessionId, TabId, ValidationError};

/// Default number of history entries kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 500;

/// A visited page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: HistoryId,
    pub url: String,
    pub title: String,
    pub visited_at: DateTime<FixedOffset>,
}

/// Newest-first visit log with a size cap.
#[derive(Debug)]
pub struct History<S> {
    items: Vec<HistoryItem>,
    limit: usize,
    store: S,
}

impl<S: DocumentStore> History<S> {
    pub fn load(store: S, limit: usize) -> Self {
        let mut items: Vec<HistoryItem> = load_document(&store, HISTORY_KEY).unwrap_or_default();
        let limit = limit.max(1);
        items.truncate(limit);
        Self { items, limit, store }
    }

    /// Entries, most recent first.
    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    /// Records a visit, dropping the oldest entries beyond the cap.
    pub fn record(
        &mut self,
        url: &str,
        title: &str,
        visited_at: DateTime<FixedOffset>,
    ) -> Result<HistoryId, PersistenceError> {
        let item = HistoryItem {
            id: HistoryId::new(),
            url: url.to_string(),
            title: title.to_string(),
            visited_at,
        };
        let id = item.id;
        self.items.insert(0, item);
        self.items.truncate(self.limit);
        self.save()?;
        Ok(id)
    }

    /// Forgets every visit.
    pub fn clear(&mut self) -> Result<(), PersistenceError> {
        self.items.clear();
        self.save()
    }

    fn save(&self) -> Result<(), PersistenceError> {
        save_document(&self.store, HISTORY_KEY, &self.items)
    }
}

/// A saved page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: BookmarkId,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<FixedOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

/// Saved pages in insertion order.
#[derive(Debug)]
pub struct Bookmarks<S> {
    items: Vec<Bookmark>,
    store: S,
}

impl<S: DocumentStore> Bookmarks<S> {
    pub fn load(store: S) -> Self {
        let items = load_document(&store, BOOKMARKS_KEY).unwrap_or_default();
        Self { items, store }
    }

    pub fn items(&self) -> &[Bookmark] {
        &self.items
    }

    /// Saves a page. The URL must not be empty.
    pub fn add(
        &mut self,
        title: &str,
        url: &str,
        folder: Option<&str>,
        created_at: DateTime<FixedOffset>,
    ) -> Result<BookmarkId, LibraryError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ValidationError::Empty { field: "url" }.into());
        }
        let title = match title.trim() {
            "" => url,
            title => title,
        };
        let bookmark = Bookmark {
            id: BookmarkId::new(),
            title: title.to_string(),
            url: url.to_string(),
            created_at,
            folder: folder.map(str::trim).filter(|f| !f.is_empty()).map(String::from),
        };
        let id = bookmark.id;
        self.items.push(bookmark);
        save_document(&self.store, BOOKMARKS_KEY, &self.items)?;
        Ok(id)
    }

    /// Deletes a bookmark, returning whether it existed.
    pub fn remove(&mut self, id: BookmarkId) -> Result<bool, PersistenceError> {
        let before = self.items.len();
        self.items.retain(|b| b.id != id);
        if self.items.len() == before {
            return Ok(false);
        }
        save_document(&self.store, BOOKMARKS_KEY, &self.items)?;
        Ok(true)
    }
}

/// A free-form note, optionally tied to the page it was taken on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Notes in the order they were taken.
#[derive(Debug)]
pub struct Notes<S> {
    items: Vec<Note>,
    store: S,
}

impl<S: DocumentStore> Notes<S> {
    pub fn load(store: S) -> Self {
        let items = load_document(&store, NOTES_KEY).unwrap_or_default();
        Self { items, store }
    }

    pub fn items(&self) -> &[Note] {
        &self.items
    }

    /// Takes a note. Blank content is rejected; blank tags are dropped.
    pub fn add(
        &mut self,
        content: &str,
        source_url: Option<&str>,
        tags: &[String],
        created_at: DateTime<FixedOffset>,
    ) -> Result<NoteId, LibraryError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ValidationError::Empty { field: "note" }.into());
        }
        let note = Note {
            id: NoteId::new(),
            content: content.to_string(),
            source_url: source_url.map(str::trim).filter(|u| !u.is_empty()).map(String::from),
            created_at,
            tags: tags
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect(),
        };
        let id = note.id;
        self.items.push(note);
        save_document(&self.store, NOTES_KEY, &self.items)?;
        Ok(id)
    }

    /// Deletes a note, returning whether it existed.
    pub fn remove(&mut self, id: NoteId) -> Result<bool, PersistenceError> {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        if self.items.len() == before {
            return Ok(false);
        }
        save_document(&self.store, NOTES_KEY, &self.items)?;
        Ok(true)
    }
}

/// Title given to a tab that has not loaded anything.
pub const NEW_TAB_TITLE: &str = "New Tab";

/// How long a background tab stays live before it is suspended.
pub const TAB_IDLE_MINUTES: i64 = 5;

/// One browser tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: TabId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub title: String,
    pub last_accessed_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub suspended: bool,
}

impl Tab {
    /// An empty tab opened at `now`.
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            id: TabId::new(),
            url: None,
            title: NEW_TAB_TITLE.to_string(),
            last_accessed_at: now,
            suspended: false,
        }
    }

    /// Whether the tab has gone unused for longer than [`TAB_IDLE_MINUTES`].
    pub fn is_idle(&self, now: DateTime<FixedOffset>) -> bool {
        now - self.last_accessed_at > Duration::minutes(TAB_IDLE_MINUTES)
    }
}

/// Sessions untouched for longer than this are dropped on load.
pub const SESSION_TTL_DAYS: i64 = 7;

/// A named set of tabs saved for later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    pub tabs: Vec<Tab>,
    pub created_at: DateTime<FixedOffset>,
    pub last_accessed_at: DateTime<FixedOffset>,
}

impl Session {
    /// A new session, last accessed at creation.
    pub fn new(name: &str, tabs: Vec<Tab>, now: DateTime<FixedOffset>) -> Self {
        Self {
            id: SessionId::new(),
            name: name.trim().to_string(),
            tabs,
            created_at: now,
            last_accessed_at: now,
        }
    }

    /// Whether the session has gone unopened for more than
    /// [`SESSION_TTL_DAYS`]. Exactly seven days old is still live.
    pub fn is_expired(&self, now: DateTime<FixedOffset>) -> bool {
        now - self.last_accessed_at > Duration::days(SESSION_TTL_DAYS)
    }
}

/// Saved sessions, swept for expired entries on load.
#[derive(Debug)]
pub struct Sessions<S, C> {
    items: Vec<Session>,
    store: S,
    clock: C,
}

impl<S: DocumentStore, C: Clock> Sessions<S, C> {
    /// Loads sessions and drops the expired ones.
    ///
    /// The sweep is saved straight away; a failed write is logged and the
    /// sweep is retried on the next load.
    pub fn load(store: S, clock: C) -> Self {
        let mut items: Vec<Session> = load_document(&store, SESSIONS_KEY).unwrap_or_default();
        let now = clock.now();
        let before = items.len();
        items.retain(|session| !session.is_expired(now));
        let expired = before - items.len();
        let sessions = Self { items, store, clock };
        if expired > 0 {
            tracing::info!(expired, "dropped expired sessions");
            if let Err(err) = sessions.save_all() {
                tracing::warn!(error = %err, "failed to save session sweep");
            }
        }
        sessions
    }

    pub fn items(&self) -> &[Session] {
        &self.items
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.items.iter().find(|s| s.id == id)
    }

    /// Inserts a session, or replaces the one with the same id in place.
    pub fn save(&mut self, session: Session) -> Result<(), LibraryError> {
        if session.name.is_empty() {
            return Err(ValidationError::Empty { field: "session name" }.into());
        }
        match self.items.iter().position(|s| s.id == session.id) {
            Some(index) => self.items[index] = session,
            None => self.items.push(session),
        }
        self.save_all()?;
        Ok(())
    }

    /// Marks a session as opened now and returns it.
    pub fn open(&mut self, id: SessionId) -> Result<Option<Session>, PersistenceError> {
        let now = self.clock.now();
        let Some(session) = self.items.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        session.last_accessed_at = now;
        let opened = session.clone();
        self.save_all()?;
        Ok(Some(opened))
    }

    /// Deletes a session, returning whether it existed.
    pub fn remove(&mut self, id: SessionId) -> Result<bool, PersistenceError> {
        let before = self.items.len();
        self.items.retain(|s| s.id != id);
        if self.items.len() == before {
            return Ok(false);
        }
        self.save_all()?;
        Ok(true)
    }

    fn save_all(&self) -> Result<(), PersistenceError> {
        save_document(&self.store, SESSIONS_KEY, &self.items)
    }
}

/// Errors adding to a collection.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;
    use chrono::{NaiveDate, TimeZone};

    fn at(minute: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 6, 1, 9, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_history_is_newest_first_and_capped() {
        let store = MemoryStore::new();
        let mut history = History::load(&store, 3);
        for (i, url) in ["a.com", "b.com", "c.com", "d.com"].iter().enumerate() {
            history.record(url, url, at(u32::try_from(i).unwrap())).unwrap();
        }
        let urls: Vec<&str> = history.items().iter().map(|h| h.url.as_str()).collect();
        assert_eq!(urls, ["d.com", "c.com", "b.com"]);

        let reloaded = History::load(&store, 3);
        assert_eq!(reloaded.items(), history.items());
    }

    #[test]
    fn test_clearing_history_persists() {
        let store = MemoryStore::new();
        let mut history = History::load(&store, DEFAULT_HISTORY_LIMIT);
        history.record("https://a.com/", "A", at(0)).unwrap();
        history.clear().unwrap();
        assert!(History::load(&store, DEFAULT_HISTORY_LIMIT).items().is_empty());
    }

    #[test]
    fn test_bookmarks_add_and_remove() {
        let store = MemoryStore::new();
        let mut bookmarks = Bookmarks::load(&store);
        let id = bookmarks
            .add("", "https://doc.rust-lang.org/", Some(" reading "), at(0))
            .unwrap();
        assert_eq!(bookmarks.items()[0].title, "https://doc.rust-lang.org/");
        assert_eq!(bookmarks.items()[0].folder.as_deref(), Some("reading"));

        assert_eq!(Bookmarks::load(&store).items().len(), 1);
        assert!(bookmarks.remove(id).unwrap());
        assert!(!bookmarks.remove(id).unwrap());
        assert!(Bookmarks::load(&store).items().is_empty());
    }

    #[test]
    fn test_bookmark_requires_url() {
        let store = MemoryStore::new();
        let mut bookmarks = Bookmarks::load(&store);
        let err = bookmarks.add("Title", "  ", None, at(0)).unwrap_err();
        assert!(matches!(err, LibraryError::Validation(_)));
    }

    #[test]
    fn test_notes_add_trims_and_remove() {
        let store = MemoryStore::new();
        let mut notes = Notes::load(&store);
        let tags = vec!["rust".to_string(), "  ".to_string()];
        let id = notes
            .add("  read the async book ", Some("https://rust-lang.github.io/async-book/"), &tags, at(0))
            .unwrap();

        let reloaded = Notes::load(&store);
        assert_eq!(reloaded.items().len(), 1);
        assert_eq!(reloaded.items()[0].content, "read the async book");
        assert_eq!(reloaded.items()[0].tags, ["rust"]);
        assert!(store.raw(NOTES_KEY).unwrap().contains("\"sourceUrl\""));

        assert!(notes.remove(id).unwrap());
        assert!(!notes.remove(id).unwrap());
        assert!(Notes::load(&store).items().is_empty());
    }

    #[test]
    fn test_blank_note_is_rejected() {
        let store = MemoryStore::new();
        let mut notes = Notes::load(&store);
        let err = notes.add(" ", None, &[], at(0)).unwrap_err();
        assert!(matches!(err, LibraryError::Validation(ValidationError::Empty { field: "note" })));
        assert_eq!(store.write_count(), 0);
    }

    fn clock() -> ManualClock {
        ManualClock::at_noon(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
    }

    #[test]
    fn test_session_save_upserts_by_id() {
        let store = MemoryStore::new();
        let clock = clock();
        let mut sessions = Sessions::load(&store, &clock);

        let mut session = Session::new("research", vec![Tab::new(clock.now())], clock.now());
        sessions.save(session.clone()).unwrap();
        session.name = "deep research".to_string();
        session.tabs.push(Tab::new(clock.now()));
        sessions.save(session.clone()).unwrap();
        sessions.save(Session::new("other", Vec::new(), clock.now())).unwrap();

        let reloaded = Sessions::load(&store, &clock);
        assert_eq!(reloaded.items().len(), 2);
        assert_eq!(reloaded.items()[0], session);
        assert_eq!(reloaded.get(session.id).unwrap().tabs.len(), 2);
    }

    #[test]
    fn test_session_requires_name() {
        let store = MemoryStore::new();
        let clock = clock();
        let mut sessions = Sessions::load(&store, &clock);
        let err = sessions.save(Session::new("  ", Vec::new(), clock.now())).unwrap_err();
        assert!(matches!(err, LibraryError::Validation(_)));
    }

    #[test]
    fn test_load_drops_sessions_older_than_seven_days() {
        let store = MemoryStore::new();
        let clock = clock();
        let mut sessions = Sessions::load(&store, &clock);
        let boundary = Session::new("boundary", Vec::new(), clock.now());
        let stale = Session::new("stale", Vec::new(), clock.now() - Duration::seconds(1));
        sessions.save(boundary.clone()).unwrap();
        sessions.save(stale).unwrap();

        clock.advance_days(SESSION_TTL_DAYS);
        let swept = Sessions::load(&store, &clock);
        let names: Vec<&str> = swept.items().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["boundary"]);
        // The sweep is persisted.
        assert!(!store.raw(SESSIONS_KEY).unwrap().contains("stale"));

        clock.advance(Duration::seconds(1));
        assert!(Sessions::load(&store, &clock).items().is_empty());
    }

    #[test]
    fn test_opening_a_session_renews_it() {
        let store = MemoryStore::new();
        let clock = clock();
        let mut sessions = Sessions::load(&store, &clock);
        let session = Session::new("reading", Vec::new(), clock.now());
        sessions.save(session.clone()).unwrap();

        clock.advance_days(6);
        let opened = sessions.open(session.id).unwrap().unwrap();
        assert_eq!(opened.last_accessed_at, clock.now());

        clock.advance_days(6);
        assert_eq!(Sessions::load(&store, &clock).items().len(), 1);
        assert!(sessions.open(SessionId::new()).unwrap().is_none());
    }

    #[test]
    fn test_session_remove() {
        let store = MemoryStore::new();
        let clock = clock();
        let mut sessions = Sessions::load(&store, &clock);
        let session = Session::new("reading", Vec::new(), clock.now());
        sessions.save(session.clone()).unwrap();
        assert!(sessions.remove(session.id).unwrap());
        assert!(!sessions.remove(session.id).unwrap());
        assert!(Sessions::load(&store, &clock).items().is_empty());
    }

    #[test]
    fn test_tab_idles_after_five_minutes() {
        let tab = Tab::new(at(0));
        assert!(!tab.is_idle(at(5)));
        assert!(tab.is_idle(at(6)));
        assert_eq!(tab.title, NEW_TAB_TITLE);
    }
}
