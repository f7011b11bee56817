//! Fire-and-forget notification sink.
//!
//! Hosts map these to haptics, banners, or terminal output. Nothing is
//! acknowledged, and a sink without permission simply drops them.

use std::cell::RefCell;
use std::fmt;

/// Kinds of user-facing signal the core can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotifyKind {
    FocusStarted,
    RestStarted,
    FocusCompleted,
    RestCompleted,
    SiteLocked,
}

impl NotifyKind {
    /// Short message suitable for a banner.
    pub const fn message(self) -> &'static str {
        match self {
            Self::FocusStarted => "Focus started",
            Self::RestStarted => "Break started",
            Self::FocusCompleted => "Focus complete! Time for a break",
            Self::RestCompleted => "Break over. Ready for another round?",
            Self::SiteLocked => "Daily limit reached for this site",
        }
    }
}

impl fmt::Display for NotifyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::FocusStarted => "focus_started",
            Self::RestStarted => "rest_started",
            Self::FocusCompleted => "focus_completed",
            Self::RestCompleted => "rest_completed",
            Self::SiteLocked => "site_locked",
        };
        write!(f, "{s}")
    }
}

/// Receives notifications.
pub trait Notifier {
    fn notify(&self, kind: NotifyKind);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, kind: NotifyKind) {
        (**self).notify(kind);
    }
}

impl<N: Notifier + ?Sized> Notifier for std::rc::Rc<N> {
    fn notify(&self, kind: NotifyKind) {
        (**self).notify(kind);
    }
}

/// Drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _kind: NotifyKind) {}
}

/// Collects notifications in order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: RefCell<Vec<NotifyKind>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything received so far.
    pub fn kinds(&self) -> Vec<NotifyKind> {
        self.seen.borrow().clone()
    }

    /// Drains the recorded notifications.
    pub fn take(&self) -> Vec<NotifyKind> {
        self.seen.take()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NotifyKind) {
        self.seen.borrow_mut().push(kind);
    }
}
