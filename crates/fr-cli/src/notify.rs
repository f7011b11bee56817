//! Terminal notification sink.

use fr_core::{Notifier, NotifyKind};

/// Prints notifications to stderr, or drops them when disabled.
#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    enabled: bool,
}

impl TerminalNotifier {
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, kind: NotifyKind) {
        tracing::debug!(%kind, "notification");
        if self.enabled {
            eprintln!("[{kind}] {}", kind.message());
        }
    }
}
