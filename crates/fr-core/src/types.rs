//! Core type definitions with validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors for user-supplied values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A daily limit must be at least one minute.
    #[error("daily limit must be a positive number of minutes, got {value}")]
    NonPositiveLimit { value: i64 },

    /// An identifier did not parse as a UUID.
    #[error("invalid {kind} id: {value}")]
    InvalidId { kind: &'static str, value: String },
}

/// Generates a UUID-backed ID newtype with common trait implementations.
macro_rules! define_uuid_id {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random ID.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Returns the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| ValidationError::InvalidId {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_uuid_id!(
    /// Identity of a site limit entry.
    LimitId,
    "limit"
);

define_uuid_id!(
    /// Identity of a bookmark.
    BookmarkId,
    "bookmark"
);

define_uuid_id!(
    /// Identity of a history entry.
    HistoryId,
    "history"
);

define_uuid_id!(
    /// Identity of a note.
    NoteId,
    "note"
);

define_uuid_id!(
    /// Identity of a saved browsing session.
    SessionId,
    "session"
);

define_uuid_id!(
    /// Identity of a tab.
    TabId,
    "tab"
);

/// Normalizes a user-entered domain into a ledger match key.
///
/// Surrounding whitespace is dropped and the result is lower-cased, since
/// host matching is case-insensitive.
pub fn normalize_domain(domain: &str) -> Result<String, ValidationError> {
    let domain = domain.trim().to_ascii_lowercase();
    if domain.is_empty() {
        return Err(ValidationError::Empty { field: "domain" });
    }
    Ok(domain)
}

/// Checks that a daily limit is a positive number of minutes.
pub fn validate_limit(minutes: i64) -> Result<u32, ValidationError> {
    if minutes <= 0 {
        return Err(ValidationError::NonPositiveLimit { value: minutes });
    }
    u32::try_from(minutes).map_err(|_| ValidationError::NonPositiveLimit { value: minutes })
}
