//! Browser controller: the glue between a render surface and the ledger.
//!
//! The render surface (an embedded browser engine in a real host) loads URLs
//! and reports finished navigations. The controller checks every host change
//! against the [`UsageLedger`], turns elapsed time on a site into accrued
//! minutes, and blocks navigation to locked sites.
//!
//! Usage is counted two ways. While the accrual timer runs the host calls
//! [`BrowserController::usage_tick`] every 60 seconds, which accrues one
//! minute. When the user leaves a site, any whole minutes of the visit not
//! already covered by ticks are accrued. A minute is never counted twice.

use chrono::{DateTime, FixedOffset};
use url::Url;

use crate::address::{AddressError, DEFAULT_SEARCH_URL, host_of, resolve_input};
use crate::clock::Clock;
use crate::focus::{FocusSession, FocusState};
use crate::ledger::{LimitStatus, UsageLedger};
use crate::library::{History, Session, Tab};
use crate::notify::{Notifier, NotifyKind};
use crate::store::DocumentStore;

/// Home page used when none is configured.
pub const DEFAULT_HOME_URL: &str = "https://www.google.com";

/// Most tabs a controller keeps open.
pub const MAX_TABS: usize = 10;

/// The page-rendering collaborator.
pub trait RenderSurface {
    /// Starts loading `url`.
    fn load(&mut self, url: &Url);
    /// Abandons the current page for the previous one.
    fn go_back(&mut self);
    fn go_forward(&mut self);
    fn can_go_back(&self) -> bool;
    fn can_go_forward(&self) -> bool;
}

/// A surface that renders nothing and remembers what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    stack: Vec<Url>,
    position: usize,
    /// Every `load` request, in order.
    pub loads: Vec<Url>,
    /// Number of `go_back` requests.
    pub back_requests: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The page the surface is showing.
    pub fn current(&self) -> Option<&Url> {
        self.position.checked_sub(1).and_then(|i| self.stack.get(i))
    }
}

impl RenderSurface for RecordingSurface {
    fn load(&mut self, url: &Url) {
        self.stack.truncate(self.position);
        self.stack.push(url.clone());
        self.position = self.stack.len();
        self.loads.push(url.clone());
    }

    fn go_back(&mut self) {
        self.back_requests += 1;
        if self.position > 1 {
            self.position -= 1;
        }
    }

    fn go_forward(&mut self) {
        if self.position < self.stack.len() {
            self.position += 1;
        }
    }

    fn can_go_back(&self) -> bool {
        self.position > 1
    }

    fn can_go_forward(&self) -> bool {
        self.position < self.stack.len()
    }
}

/// Result of a navigation request or report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The page is (being) shown.
    Loaded(Url),
    /// The target host is over its daily limit.
    Blocked { host: String },
}

/// Result of the periodic usage check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageCheck {
    /// Nothing to account: no page, or accrual is suspended.
    Inactive,
    /// The current site may be used; carries its status when it is managed.
    Allowed(Option<LimitStatus>),
    /// The current site just used up its allowance.
    Locked(LimitStatus),
}

/// Controller settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserOptions {
    pub home_url: String,
    pub search_url: String,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            home_url: DEFAULT_HOME_URL.to_string(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
        }
    }
}

/// The page currently on screen and how much of the visit is accounted.
#[derive(Debug, Clone)]
struct Visit {
    url: Url,
    host: Option<String>,
    title: String,
    started_at: Option<DateTime<FixedOffset>>,
    ticked_minutes: i64,
}

impl Visit {
    fn new(url: Url, started_at: Option<DateTime<FixedOffset>>) -> Self {
        let host = host_of(&url);
        let title = host.clone().unwrap_or_default();
        Self {
            url,
            host,
            title,
            started_at,
            ticked_minutes: 0,
        }
    }

    /// Resumes a tab's page, if it has one that parses.
    fn for_tab(tab: &Tab, started_at: Option<DateTime<FixedOffset>>) -> Option<Self> {
        let url = Url::parse(tab.url.as_deref()?).ok()?;
        let mut visit = Self::new(url, started_at);
        visit.title.clone_from(&tab.title);
        Some(visit)
    }

    fn restart(&mut self, at: Option<DateTime<FixedOffset>>) {
        self.started_at = at;
        self.ticked_minutes = 0;
    }
}

/// Drives navigation, tabs, usage accounting, and focus mode for one
/// browsing surface.
///
/// Owned by the application root; collaborators are injected at
/// construction. Only the current tab accrues usage: switching, opening, or
/// closing tabs records the time spent on the page being left.
pub struct BrowserController<R, S, C, N> {
    surface: R,
    ledger: UsageLedger<S, C>,
    history: History<S>,
    focus: FocusSession<N>,
    options: BrowserOptions,
    tabs: Vec<Tab>,
    current: usize,
    visit: Option<Visit>,
    accrual_active: bool,
    site_locked: bool,
    focus_mode: bool,
}

impl<R, S, C, N> BrowserController<R, S, C, N>
where
    R: RenderSurface,
    S: DocumentStore,
    C: Clock,
    N: Notifier,
{
    /// Creates a controller with one empty tab.
    pub fn new(
        surface: R,
        ledger: UsageLedger<S, C>,
        history: History<S>,
        focus: FocusSession<N>,
        options: BrowserOptions,
    ) -> Self {
        let tabs = vec![Tab::new(ledger.clock().now())];
        Self {
            surface,
            ledger,
            history,
            focus,
            options,
            tabs,
            current: 0,
            visit: None,
            accrual_active: true,
            site_locked: false,
            focus_mode: false,
        }
    }

    pub const fn surface(&self) -> &R {
        &self.surface
    }

    pub const fn surface_mut(&mut self) -> &mut R {
        &mut self.surface
    }

    pub const fn ledger(&self) -> &UsageLedger<S, C> {
        &self.ledger
    }

    pub const fn ledger_mut(&mut self) -> &mut UsageLedger<S, C> {
        &mut self.ledger
    }

    pub const fn history(&self) -> &History<S> {
        &self.history
    }

    pub const fn focus(&self) -> &FocusSession<N> {
        &self.focus
    }

    pub const fn focus_mut(&mut self) -> &mut FocusSession<N> {
        &mut self.focus
    }

    /// URL of the page on screen.
    pub fn current_url(&self) -> Option<&Url> {
        self.visit.as_ref().map(|v| &v.url)
    }

    pub fn current_title(&self) -> Option<&str> {
        self.visit.as_ref().map(|v| v.title.as_str())
    }

    /// Whether the "site locked" notice should be shown.
    pub const fn is_site_locked(&self) -> bool {
        self.site_locked
    }

    pub fn dismiss_site_lock(&mut self) {
        self.site_locked = false;
    }

    pub const fn is_focus_mode(&self) -> bool {
        self.focus_mode
    }

    pub fn can_go_back(&self) -> bool {
        self.surface.can_go_back()
    }

    pub fn can_go_forward(&self) -> bool {
        self.surface.can_go_forward()
    }

    pub fn go_back(&mut self) {
        self.surface.go_back();
    }

    pub fn go_forward(&mut self) {
        self.surface.go_forward();
    }

    /// Opens whatever the user typed in the address bar.
    pub fn navigate(&mut self, input: &str) -> Result<NavigationOutcome, AddressError> {
        let url = resolve_input(input, &self.options.search_url)?;
        Ok(self.open(url))
    }

    /// Opens the configured home page.
    pub fn go_home(&mut self) -> Result<NavigationOutcome, AddressError> {
        let url = Url::parse(&self.options.home_url).map_err(|source| AddressError::Invalid {
            input: self.options.home_url.clone(),
            source,
        })?;
        Ok(self.open(url))
    }

    fn open(&mut self, url: Url) -> NavigationOutcome {
        if let Some(host) = host_of(&url) {
            if self.ledger.is_locked(&host) {
                tracing::info!(%host, "navigation blocked by site limit");
                self.raise_site_lock();
                return NavigationOutcome::Blocked { host };
            }
        }

        self.record_site_usage();
        self.visit = Some(Visit::new(url.clone(), self.visit_start()));
        self.sync_current_tab();
        self.surface.load(&url);
        NavigationOutcome::Loaded(url)
    }

    /// Handles a navigation the surface finished on its own (links,
    /// redirects, back/forward).
    ///
    /// When the host changed, usage for the previous host is recorded and the
    /// new host's lock is checked; a locked host sends the surface back.
    pub fn navigation_finished(&mut self, url: &Url, title: &str) -> NavigationOutcome {
        let new_host = host_of(url);
        let old_host = self.visit.as_ref().and_then(|v| v.host.clone());
        let now = self.ledger.clock().now();
        let start = self.visit_start();

        if old_host != new_host {
            self.record_site_usage();
            if let Some(visit) = self.visit.as_mut() {
                visit.restart(start);
            }

            if let Some(host) = new_host.as_deref() {
                if self.ledger.is_locked(host) {
                    tracing::info!(%host, "left locked site");
                    self.raise_site_lock();
                    self.surface.go_back();
                    return NavigationOutcome::Blocked {
                        host: host.to_string(),
                    };
                }
            }
        }

        let visit = self
            .visit
            .get_or_insert_with(|| Visit::new(url.clone(), start));
        visit.url = url.clone();
        visit.host.clone_from(&new_host);
        visit.title = match title.trim() {
            "" => new_host.clone().unwrap_or_else(|| "Untitled".to_string()),
            title => title.to_string(),
        };

        let title = visit.title.clone();
        self.sync_current_tab();
        if let Err(err) = self.history.record(url.as_str(), &title, now) {
            tracing::warn!(error = %err, "failed to save history");
        }
        NavigationOutcome::Loaded(url.clone())
    }

    /// The 60-second accrual callback.
    ///
    /// Accrues one minute for the current site, then evaluates its lock. The
    /// ledger applies any day reset before either step.
    pub fn usage_tick(&mut self) -> UsageCheck {
        if !self.accrual_active {
            return UsageCheck::Inactive;
        }
        let Some(visit) = self.visit.as_mut() else {
            return UsageCheck::Inactive;
        };
        let Some(host) = visit.host.clone() else {
            return UsageCheck::Inactive;
        };

        if visit.started_at.is_some() {
            visit.ticked_minutes += 1;
            if let Err(err) = self.ledger.accrue(&host, 1) {
                tracing::warn!(%host, error = %err, "usage accrued but not saved");
            }
        }

        match self.ledger.status_for(&host) {
            Some(status) if status.locked => {
                self.raise_site_lock();
                UsageCheck::Locked(status)
            }
            status => UsageCheck::Allowed(status),
        }
    }

    /// Stops usage accounting, e.g. when the surface is backgrounded.
    ///
    /// Whole minutes since the last tick are recorded first. Idempotent.
    pub fn suspend(&mut self) {
        if !self.accrual_active {
            return;
        }
        self.record_site_usage();
        self.accrual_active = false;
        tracing::debug!("usage accrual suspended");
    }

    /// Restarts usage accounting for the current page. Idempotent.
    pub fn resume_usage(&mut self) {
        if self.accrual_active {
            return;
        }
        self.accrual_active = true;
        let start = self.visit_start();
        if let Some(visit) = self.visit.as_mut() {
            visit.restart(start);
        }
        tracing::debug!("usage accrual resumed");
    }

    /// Turns focus mode on (starting a focus interval) or off (stopping the
    /// session). Returns the new mode.
    pub fn toggle_focus_mode(&mut self) -> bool {
        self.focus_mode = !self.focus_mode;
        if self.focus_mode {
            self.focus.start_focus();
        } else {
            self.focus.stop();
        }
        tracing::debug!(focus_mode = self.focus_mode, "focus mode toggled");
        self.focus_mode
    }

    /// Open tabs, in display order.
    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub const fn current_tab_index(&self) -> usize {
        self.current
    }

    pub fn current_tab(&self) -> &Tab {
        &self.tabs[self.current]
    }

    /// Opens an empty tab and switches to it. Returns `false` when
    /// [`MAX_TABS`] are already open.
    pub fn add_tab(&mut self) -> bool {
        if self.tabs.len() >= MAX_TABS {
            tracing::debug!(max = MAX_TABS, "tab limit reached");
            return false;
        }
        self.record_site_usage();
        self.tabs.push(Tab::new(self.ledger.clock().now()));
        self.current = self.tabs.len() - 1;
        self.visit = None;
        true
    }

    /// Closes the tab at `index`. The last remaining tab cannot be closed.
    ///
    /// Closing the current tab records its usage and moves to the tab that
    /// takes its place; closing a background tab leaves the current visit
    /// running.
    pub fn close_tab(&mut self, index: usize) -> bool {
        if self.tabs.len() <= 1 || index >= self.tabs.len() {
            return false;
        }
        if index == self.current {
            self.record_site_usage();
            self.tabs.remove(index);
            self.current = self.current.min(self.tabs.len() - 1);
            self.enter_current_tab();
        } else {
            self.tabs.remove(index);
            if index < self.current {
                self.current -= 1;
            }
        }
        true
    }

    /// Switches to the tab at `index`, recording usage for the page left.
    pub fn select_tab(&mut self, index: usize) -> bool {
        if index == self.current || index >= self.tabs.len() {
            return false;
        }
        self.record_site_usage();
        self.current = index;
        self.enter_current_tab();
        true
    }

    /// Marks background tabs idle past the threshold as suspended.
    ///
    /// The 60-second housekeeping callback; returns how many tabs changed.
    pub fn suspend_idle_tabs(&mut self) -> usize {
        let now = self.ledger.clock().now();
        let current = self.current;
        let mut suspended = 0;
        for (index, tab) in self.tabs.iter_mut().enumerate() {
            if index != current && !tab.suspended && tab.is_idle(now) {
                tab.suspended = true;
                suspended += 1;
            }
        }
        if suspended > 0 {
            tracing::debug!(suspended, "suspended idle tabs");
        }
        suspended
    }

    /// Captures the open tabs as a named session.
    pub fn snapshot_session(&self, name: &str) -> Session {
        Session::new(name, self.tabs.clone(), self.ledger.clock().now())
    }

    /// Replaces the open tabs with a saved session's, starting on its first
    /// tab. An empty session restores as a single empty tab.
    pub fn restore_session(&mut self, session: &Session) {
        self.record_site_usage();
        self.tabs.clone_from(&session.tabs);
        if self.tabs.is_empty() {
            self.tabs.push(Tab::new(self.ledger.clock().now()));
        }
        self.current = 0;
        self.enter_current_tab();
        tracing::debug!(session = %session.name, tabs = self.tabs.len(), "session restored");
    }

    /// Whether a focus interval (not a break) is running.
    pub fn is_focusing(&self) -> bool {
        self.focus.state() == FocusState::Focusing
    }

    /// Accrues the whole minutes of the current visit that no tick covered,
    /// then stops the visit clock.
    fn record_site_usage(&mut self) {
        let now = self.ledger.clock().now();
        let Some(visit) = self.visit.as_mut() else {
            return;
        };
        let Some(started_at) = visit.started_at.take() else {
            return;
        };
        let ticked = std::mem::take(&mut visit.ticked_minutes);
        let Some(host) = visit.host.clone() else {
            return;
        };

        let minutes = (now - started_at).num_minutes() - ticked;
        if minutes <= 0 {
            return;
        }
        let minutes = u32::try_from(minutes).unwrap_or(u32::MAX);
        if let Err(err) = self.ledger.accrue(&host, minutes) {
            tracing::warn!(%host, error = %err, "usage accrued but not saved");
        }
    }

    /// Makes the current tab live and resumes its page, if any.
    fn enter_current_tab(&mut self) {
        let now = self.ledger.clock().now();
        let start = self.visit_start();
        let tab = &mut self.tabs[self.current];
        tab.last_accessed_at = now;
        tab.suspended = false;
        self.visit = Visit::for_tab(tab, start);
    }

    /// Copies the current page onto the current tab.
    fn sync_current_tab(&mut self) {
        let now = self.ledger.clock().now();
        let tab = &mut self.tabs[self.current];
        if let Some(visit) = &self.visit {
            tab.url = Some(visit.url.to_string());
            tab.title.clone_from(&visit.title);
        }
        tab.last_accessed_at = now;
        tab.suspended = false;
    }

    /// Start time for a new visit clock; none while accrual is suspended.
    fn visit_start(&self) -> Option<DateTime<FixedOffset>> {
        self.accrual_active.then(|| self.ledger.clock().now())
    }

    fn raise_site_lock(&mut self) {
        self.site_locked = true;
        self.focus.notifier().notify(NotifyKind::SiteLocked);
    }
}
