//! Per-site daily usage accounting and lockout policy.
//!
//! # Day boundaries
//!
//! Counters reset lazily: the first time an entry is touched on a new local
//! calendar day its usage drops to zero. There is no background job. Every
//! read or write of an entry's usage goes through
//! [`SiteLimit::reset_if_stale`], which is why the counter is private and only
//! reachable through methods that take `today`.
//!
//! # Matching
//!
//! A host is matched against entries by case-insensitive substring
//! containment, so `twitter.com` covers `mobile.twitter.com`. The first
//! matching entry in ledger order wins and at most one entry accrues time per
//! call. Overlapping domains (`x.com` and `sub.x.com`) therefore resolve by
//! insertion order, not by specificity.
//!
//! # Persistence
//!
//! The whole ledger is one document under [`SITE_LIMITS_KEY`]. Mutations are
//! applied in memory first; a failed write leaves the in-memory ledger as the
//! source of truth and marks it dirty, and the next successful write of the
//! whole document reconciles the store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::Clock;
use crate::store::{DocumentStore, PersistenceError, SITE_LIMITS_KEY, load_document, save_document};
use crate::types::{LimitId, ValidationError, normalize_domain, validate_limit};

/// Limit used when a domain is added without an explicit value.
pub const DEFAULT_DAILY_LIMIT_MINUTES: u32 = 30;

/// Errors from ledger mutations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The mutation was applied in memory but could not be written.
    #[error("ledger changed but was not saved")]
    Persistence(#[from] PersistenceError),
}

/// A daily time allowance for one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteLimit {
    id: LimitId,
    domain: String,
    daily_limit_minutes: u32,
    used_minutes_today: u32,
    last_reset_date: NaiveDate,
}

impl SiteLimit {
    /// Creates an entry with no usage, last reset `today`.
    pub fn new(domain: &str, daily_limit_minutes: u32, today: NaiveDate) -> Result<Self, ValidationError> {
        let domain = normalize_domain(domain)?;
        let daily_limit_minutes = validate_limit(i64::from(daily_limit_minutes))?;
        Ok(Self {
            id: LimitId::new(),
            domain,
            daily_limit_minutes,
            used_minutes_today: 0,
            last_reset_date: today,
        })
    }

    pub const fn id(&self) -> LimitId {
        self.id
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub const fn daily_limit_minutes(&self) -> u32 {
        self.daily_limit_minutes
    }

    pub const fn last_reset_date(&self) -> NaiveDate {
        self.last_reset_date
    }

    /// Zeroes usage if the last reset was on another day.
    ///
    /// Returns whether anything changed.
    pub fn reset_if_stale(&mut self, today: NaiveDate) -> bool {
        if self.last_reset_date == today {
            return false;
        }
        tracing::debug!(
            domain = %self.domain,
            last_reset = %self.last_reset_date,
            %today,
            "resetting daily usage"
        );
        self.used_minutes_today = 0;
        self.last_reset_date = today;
        true
    }

    /// Minutes used today.
    pub fn used_minutes(&mut self, today: NaiveDate) -> u32 {
        self.reset_if_stale(today);
        self.used_minutes_today
    }

    /// Minutes left today, never negative.
    pub fn remaining_minutes(&mut self, today: NaiveDate) -> u32 {
        self.daily_limit_minutes
            .saturating_sub(self.used_minutes(today))
    }

    /// Whether today's usage has reached the limit.
    pub fn is_locked(&mut self, today: NaiveDate) -> bool {
        self.used_minutes(today) >= self.daily_limit_minutes
    }

    /// Whether this entry covers `host`. Expects a lower-cased host.
    pub fn matches(&self, host: &str) -> bool {
        if self.domain.is_empty() {
            return false;
        }
        if self.domain.bytes().any(|b| b.is_ascii_uppercase()) {
            return host.contains(&self.domain.to_ascii_lowercase());
        }
        host.contains(&self.domain)
    }

    /// Adds usage without a cap; usage may exceed the limit.
    fn add_minutes(&mut self, minutes: u32, today: NaiveDate) {
        self.reset_if_stale(today);
        self.used_minutes_today = self.used_minutes_today.saturating_add(minutes);
    }

    fn status(&mut self, today: NaiveDate) -> LimitStatus {
        let used_minutes_today = self.used_minutes(today);
        LimitStatus {
            id: self.id,
            domain: self.domain.clone(),
            daily_limit_minutes: self.daily_limit_minutes,
            used_minutes_today,
            remaining_minutes: self.daily_limit_minutes.saturating_sub(used_minutes_today),
            locked: used_minutes_today >= self.daily_limit_minutes,
        }
    }
}

/// Point-in-time view of an entry, after any pending reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitStatus {
    pub id: LimitId,
    pub domain: String,
    pub daily_limit_minutes: u32,
    pub used_minutes_today: u32,
    pub remaining_minutes: u32,
    pub locked: bool,
}

/// The entries seeded on first run.
pub fn default_site_limits(today: NaiveDate) -> Vec<SiteLimit> {
    [
        ("twitter.com", 30),
        ("x.com", 30),
        ("facebook.com", 30),
        ("instagram.com", 30),
        ("tiktok.com", 20),
        ("reddit.com", 30),
    ]
    .into_iter()
    .filter_map(|(domain, minutes)| SiteLimit::new(domain, minutes, today).ok())
    .collect()
}

/// Lower-cases a host and drops a trailing root dot.
fn normalize_host(host: &str) -> String {
    host.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Ordered collection of site limits backed by a document store.
#[derive(Debug)]
pub struct UsageLedger<S, C> {
    entries: Vec<SiteLimit>,
    store: S,
    clock: C,
    dirty: bool,
}

impl<S: DocumentStore, C: Clock> UsageLedger<S, C> {
    /// Loads the ledger, seeding the default set when nothing usable is stored.
    pub fn load(store: S, clock: C) -> Self {
        if let Some(entries) = load_document::<Vec<SiteLimit>, _>(&store, SITE_LIMITS_KEY) {
            tracing::debug!(entries = entries.len(), "loaded site limits");
            return Self::from_entries(entries, store, clock);
        }

        let seed = default_site_limits(clock.today());
        tracing::info!(entries = seed.len(), "seeding default site limits");
        let mut ledger = Self::from_entries(seed, store, clock);
        ledger.dirty = true;
        // Seeded ids must survive restart so later removals can find them.
        let _ = ledger.persist();
        ledger
    }

    /// Wraps existing entries without touching the store.
    pub const fn from_entries(entries: Vec<SiteLimit>, store: S, clock: C) -> Self {
        Self {
            entries,
            store,
            clock,
            dirty: false,
        }
    }

    /// Entries in match order.
    ///
    /// Usage counters may be stale; use [`Self::statuses`] for display.
    pub fn entries(&self) -> &[SiteLimit] {
        &self.entries
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Whether in-memory state has changes the store has not accepted.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Index of the first entry covering `host`.
    fn position(&self, host: &str) -> Option<usize> {
        let host = normalize_host(host);
        if host.is_empty() {
            return None;
        }
        self.entries.iter().position(|entry| entry.matches(&host))
    }

    /// Adds `minutes` of usage to the first entry covering `host`.
    ///
    /// Unmanaged hosts are ignored and yield `Ok(None)`. The stale-day reset
    /// happens before the minutes are added. On a write failure the accrual
    /// is kept in memory and the error is returned.
    pub fn accrue(&mut self, host: &str, minutes: u32) -> Result<Option<LimitStatus>, PersistenceError> {
        let Some(index) = self.position(host) else {
            tracing::trace!(host, "no limit for host");
            return Ok(None);
        };
        let today = self.clock.today();
        let entry = &mut self.entries[index];
        let was_locked = entry.is_locked(today);
        entry.add_minutes(minutes, today);
        let status = entry.status(today);
        tracing::debug!(
            host,
            domain = %status.domain,
            minutes,
            used = status.used_minutes_today,
            "accrued site usage"
        );
        if status.locked && !was_locked {
            tracing::info!(domain = %status.domain, limit = status.daily_limit_minutes, "site limit reached");
        }
        self.dirty = true;
        self.persist()?;
        Ok(Some(status))
    }

    /// Whether `host` has used up its daily allowance.
    ///
    /// Unmanaged hosts are never locked. A pending day reset is applied and
    /// saved; a write failure is logged and does not change the answer.
    pub fn is_locked(&mut self, host: &str) -> bool {
        self.status_for(host).is_some_and(|status| status.locked)
    }

    /// Current status of the entry covering `host`, if any.
    pub fn status_for(&mut self, host: &str) -> Option<LimitStatus> {
        let index = self.position(host)?;
        let today = self.clock.today();
        let entry = &mut self.entries[index];
        if entry.reset_if_stale(today) {
            self.dirty = true;
        }
        let status = self.entries[index].status(today);
        self.persist_quietly();
        Some(status)
    }

    /// Status of every entry, applying pending day resets.
    pub fn statuses(&mut self) -> Vec<LimitStatus> {
        let today = self.clock.today();
        let mut changed = false;
        for entry in &mut self.entries {
            changed |= entry.reset_if_stale(today);
        }
        if changed {
            self.dirty = true;
        }
        let statuses: Vec<LimitStatus> = self.entries.iter_mut().map(|entry| entry.status(today)).collect();
        self.persist_quietly();
        statuses
    }

    /// Appends a new limit.
    ///
    /// Rejects an empty domain or a non-positive limit. If the write fails
    /// the entry stays in memory and is saved with the next successful write.
    pub fn add_limit(&mut self, domain: &str, daily_limit_minutes: i64) -> Result<LimitId, LedgerError> {
        let minutes = validate_limit(daily_limit_minutes)?;
        let entry = SiteLimit::new(domain, minutes, self.clock.today())?;
        let id = entry.id();
        tracing::info!(domain = %entry.domain, minutes, %id, "added site limit");
        self.entries.push(entry);
        self.dirty = true;
        self.persist()?;
        Ok(id)
    }

    /// Deletes the entry with `id`, returning it if it existed.
    pub fn remove_limit(&mut self, id: LimitId) -> Result<Option<SiteLimit>, PersistenceError> {
        let Some(index) = self.entries.iter().position(|entry| entry.id == id) else {
            return Ok(None);
        };
        let removed = self.entries.remove(index);
        tracing::info!(domain = %removed.domain, %id, "removed site limit");
        self.dirty = true;
        self.persist()?;
        Ok(Some(removed))
    }

    /// Writes pending changes, if any.
    pub fn flush(&mut self) -> Result<(), PersistenceError> {
        if self.dirty {
            self.persist()?;
        }
        Ok(())
    }

    fn persist(&mut self) -> Result<(), PersistenceError> {
        match save_document(&self.store, SITE_LIMITS_KEY, &self.entries) {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to save site limits; keeping in-memory ledger");
                self.dirty = true;
                Err(err)
            }
        }
    }

    fn persist_quietly(&mut self) {
        if self.dirty {
            // Already logged; the in-memory ledger stays authoritative.
            let _ = self.persist();
        }
    }
}
