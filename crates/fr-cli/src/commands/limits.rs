//! Site limit management commands.

use std::io::Write;

use anyhow::{Context, Result, bail};

use fr_core::{Clock, DocumentStore, LimitId, LimitStatus, UsageLedger};

/// One-line summary of a limit's state today.
pub fn describe(status: &LimitStatus) -> String {
    let state = if status.locked { "locked" } else { "allowed" };
    format!(
        "{}: {state} ({}/{} minutes used, {} remaining)",
        status.domain, status.used_minutes_today, status.daily_limit_minutes, status.remaining_minutes
    )
}

/// Lists every limit with today's usage.
pub fn list<W, S, C>(writer: &mut W, ledger: &mut UsageLedger<S, C>, json: bool) -> Result<()>
where
    W: Write,
    S: DocumentStore,
    C: Clock,
{
    let statuses = ledger.statuses();

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&statuses)?)?;
        return Ok(());
    }

    if statuses.is_empty() {
        writeln!(writer, "No site limits.")?;
        return Ok(());
    }

    for status in &statuses {
        writeln!(writer, "{}  {}", status.id, describe(status))?;
    }
    Ok(())
}

/// Adds a limit.
pub fn add<W, S, C>(
    writer: &mut W,
    ledger: &mut UsageLedger<S, C>,
    domain: &str,
    minutes: i64,
) -> Result<()>
where
    W: Write,
    S: DocumentStore,
    C: Clock,
{
    let id = ledger
        .add_limit(domain, minutes)
        .with_context(|| format!("failed to add limit for {domain:?}"))?;
    let entry = ledger
        .entries()
        .iter()
        .find(|e| e.id() == id)
        .context("added limit is missing")?;
    writeln!(
        writer,
        "Added {} ({} minutes/day): {id}",
        entry.domain(),
        entry.daily_limit_minutes()
    )?;
    Ok(())
}

/// Removes a limit by ID.
pub fn remove<W, S, C>(writer: &mut W, ledger: &mut UsageLedger<S, C>, id: &str) -> Result<()>
where
    W: Write,
    S: DocumentStore,
    C: Clock,
{
    let id: LimitId = id.parse()?;
    let Some(removed) = ledger.remove_limit(id).context("failed to save site limits")? else {
        bail!("no site limit with id {id}");
    };
    writeln!(writer, "Removed {}", removed.domain())?;
    Ok(())
}
