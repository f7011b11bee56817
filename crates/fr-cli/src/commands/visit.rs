//! Visit command: runs address bar input through the browser controller.

use std::io::Write;

use anyhow::Result;

use fr_core::{BrowserController, Clock, DocumentStore, NavigationOutcome, Notifier, RenderSurface};

use super::limits::describe;

/// Opens `input` and reports where the browser ended up.
///
/// The surface is expected to finish loads synchronously, so the navigation
/// is reported as finished straight away and recorded in history.
pub fn run<W, R, S, C, N>(
    writer: &mut W,
    controller: &mut BrowserController<R, S, C, N>,
    input: &str,
    title: Option<&str>,
) -> Result<()>
where
    W: Write,
    R: RenderSurface,
    S: DocumentStore,
    C: Clock,
    N: Notifier,
{
    let outcome = match controller.navigate(input)? {
        NavigationOutcome::Loaded(url) => controller.navigation_finished(&url, title.unwrap_or("")),
        blocked @ NavigationOutcome::Blocked { .. } => blocked,
    };

    match outcome {
        NavigationOutcome::Loaded(url) => writeln!(writer, "Loaded {url}")?,
        NavigationOutcome::Blocked { host } => {
            writeln!(writer, "Blocked {host}")?;
            if let Some(status) = controller.ledger_mut().status_for(&host) {
                writeln!(writer, "  {}", describe(&status))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use fr_core::library::DEFAULT_HISTORY_LIMIT;
    use fr_core::{
        BrowserOptions, FocusDurations, FocusSession, History, ManualClock, MemoryStore,
        NullNotifier, RecordingSurface, SiteLimit, UsageLedger,
    };

    fn controller<'a>(
        store: &'a MemoryStore,
        clock: &'a ManualClock,
    ) -> BrowserController<RecordingSurface, &'a MemoryStore, &'a ManualClock, NullNotifier> {
        let entries = vec![SiteLimit::new("reddit.com", 30, clock.today()).unwrap()];
        BrowserController::new(
            RecordingSurface::new(),
            UsageLedger::from_entries(entries, store, clock),
            History::load(store, DEFAULT_HISTORY_LIMIT),
            FocusSession::new(FocusDurations::default()),
            BrowserOptions::default(),
        )
    }

    #[test]
    fn test_search_words_load_search_page_and_record_history() {
        let store = MemoryStore::new();
        let clock = ManualClock::at_noon(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        let mut c = controller(&store, &clock);

        let mut output = Vec::new();
        run(&mut output, &mut c, "borrow checker", Some("Search")).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Loaded https://www.bing.com/search?q=borrow+checker\n"
        );
        assert_eq!(c.history().items()[0].title, "Search");
    }

    #[test]
    fn test_locked_site_is_reported_with_usage() {
        let store = MemoryStore::new();
        let clock = ManualClock::at_noon(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        let mut c = controller(&store, &clock);
        c.ledger_mut().accrue("reddit.com", 30).unwrap();

        let mut output = Vec::new();
        run(&mut output, &mut c, "old.reddit.com/r/rust", None).unwrap();
        insta::assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Blocked old.reddit.com
          reddit.com: locked (30/30 minutes used, 0 remaining)
        ");
        assert!(c.surface().loads.is_empty());
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let store = MemoryStore::new();
        let clock = ManualClock::at_noon(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        let mut c = controller(&store, &clock);
        let err = run(&mut Vec::new(), &mut c, "  ", None).unwrap_err();
        assert_eq!(err.to_string(), "address is empty");
    }
}
