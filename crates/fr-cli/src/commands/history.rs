//! History command.

use std::io::Write;

use anyhow::{Context, Result};

use fr_core::{DocumentStore, History};

/// Prints the most recent visits, or clears them.
pub fn run<W, S>(writer: &mut W, history: &mut History<S>, clear: bool, json: bool, limit: usize) -> Result<()>
where
    W: Write,
    S: DocumentStore,
{
    if clear {
        let count = history.items().len();
        history.clear().context("failed to clear history")?;
        writeln!(writer, "Cleared {count} history entries.")?;
        return Ok(());
    }

    let items: Vec<_> = history.items().iter().take(limit).collect();

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&items)?)?;
        return Ok(());
    }

    if items.is_empty() {
        writeln!(writer, "No history.")?;
        return Ok(());
    }

    for item in items {
        writeln!(
            writer,
            "{}  {}  {}",
            item.visited_at.format("%Y-%m-%d %H:%M"),
            item.title,
            item.url
        )?;
    }
    Ok(())
}
