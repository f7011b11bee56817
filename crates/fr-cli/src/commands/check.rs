//! Lock checks and manual usage accrual.

use std::io::Write;

use anyhow::{Context, Result};

use fr_core::{Clock, DocumentStore, UsageLedger, host_from_str};

use super::limits::describe;

/// Reports whether a host is locked today.
pub fn run<W, S, C>(writer: &mut W, ledger: &mut UsageLedger<S, C>, target: &str) -> Result<()>
where
    W: Write,
    S: DocumentStore,
    C: Clock,
{
    let host = host_from_str(target).with_context(|| format!("no host in {target:?}"))?;
    match ledger.status_for(&host) {
        Some(status) => writeln!(writer, "{host} -> {}", describe(&status))?,
        None => writeln!(writer, "{host}: unmanaged")?,
    }
    Ok(())
}

/// Adds minutes of usage to the limit covering a host.
pub fn accrue<W, S, C>(
    writer: &mut W,
    ledger: &mut UsageLedger<S, C>,
    target: &str,
    minutes: u32,
) -> Result<()>
where
    W: Write,
    S: DocumentStore,
    C: Clock,
{
    let host = host_from_str(target).with_context(|| format!("no host in {target:?}"))?;
    let status = ledger
        .accrue(&host, minutes)
        .context("usage recorded in memory but not saved")?;
    match status {
        Some(status) => writeln!(writer, "{host} -> {}", describe(&status))?,
        None => writeln!(writer, "{host}: unmanaged, nothing recorded")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use fr_core::{ManualClock, MemoryStore, SiteLimit};

    fn run_both(ledger: &mut UsageLedger<&MemoryStore, &ManualClock>) -> String {
        let mut output = Vec::new();
        accrue(&mut output, ledger, "https://sub.x.com/home", 31).unwrap();
        run(&mut output, ledger, "x.com").unwrap();
        run(&mut output, ledger, "y.com").unwrap();
        accrue(&mut output, ledger, "y.com", 5).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_subdomain_accrual_locks_parent_only() {
        let store = MemoryStore::new();
        let clock = ManualClock::at_noon(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        let entries = vec![SiteLimit::new("x.com", 30, clock.today()).unwrap()];
        let mut ledger = UsageLedger::from_entries(entries, &store, &clock);

        insta::assert_snapshot!(run_both(&mut ledger), @r"
        sub.x.com -> x.com: locked (31/30 minutes used, 0 remaining)
        x.com -> x.com: locked (31/30 minutes used, 0 remaining)
        y.com: unmanaged
        y.com: unmanaged, nothing recorded
        ");
    }

    #[test]
    fn test_check_after_midnight_shows_fresh_allowance() {
        let store = MemoryStore::new();
        let clock = ManualClock::at_noon(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        let entries = vec![SiteLimit::new("reddit.com", 30, clock.today()).unwrap()];
        let mut ledger = UsageLedger::from_entries(entries, &store, &clock);
        ledger.accrue("reddit.com", 40).unwrap();

        clock.advance_days(1);
        let mut output = Vec::new();
        run(&mut output, &mut ledger, "www.reddit.com").unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "www.reddit.com -> reddit.com: allowed (0/30 minutes used, 30 remaining)\n"
        );
    }

    #[test]
    fn test_failed_save_is_reported() {
        let store = MemoryStore::new();
        let clock = ManualClock::at_noon(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        let entries = vec![SiteLimit::new("x.com", 30, clock.today()).unwrap()];
        let mut ledger = UsageLedger::from_entries(entries, &store, &clock);
        store.fail_writes(true);

        let err = accrue(&mut Vec::new(), &mut ledger, "x.com", 1).unwrap_err();
        assert!(err.to_string().contains("not saved"));
        assert!(ledger.is_dirty());
    }
}
