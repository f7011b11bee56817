//! Core domain logic for the Focusr browser.
//!
//! This crate contains:
//! - Focus sessions: an alternating focus/rest countdown
//! - Usage ledger: per-site daily time accounting with lazy day resets
//! - Browser controller: navigation, accrual, and lockout for a render surface
//! - Library collections: history, bookmarks, notes, and saved sessions
//! - Document persistence contracts shared by every collection

pub mod address;
pub mod browser;
pub mod clock;
pub mod focus;
pub mod ledger;
pub mod library;
pub mod notify;
pub mod store;
mod time;
pub mod types;

pub use address::{AddressError, host_from_str, host_of, resolve_input};
pub use browser::{
    BrowserController, BrowserOptions, NavigationOutcome, RecordingSurface, RenderSurface,
    UsageCheck,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use focus::{FocusDurations, FocusEvent, FocusSession, FocusState};
pub use ledger::{LedgerError, LimitStatus, SiteLimit, UsageLedger};
pub use library::{
    Bookmark, Bookmarks, History, HistoryItem, LibraryError, Note, Notes, Session, Sessions, Tab,
};
pub use notify::{Notifier, NotifyKind, NullNotifier, RecordingNotifier};
pub use store::{DocumentStore, MemoryStore, PersistenceError};
pub use time::Metronome;
pub use types::{BookmarkId, HistoryId, LimitId, NoteId, SessionId, TabId, ValidationError};
