//! Status command for showing the store and today's lockouts.

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use fr_core::{Clock, DocumentStore, UsageLedger};
use fr_db::SqliteStore;

pub fn run<W, S, C>(
    writer: &mut W,
    database_path: &Path,
    store: &SqliteStore,
    ledger: &mut UsageLedger<S, C>,
) -> Result<()>
where
    W: Write,
    S: DocumentStore,
    C: Clock,
{
    let statuses = ledger.statuses();
    let locked: Vec<&str> = statuses
        .iter()
        .filter(|s| s.locked)
        .map(|s| s.domain.as_str())
        .collect();

    writeln!(writer, "Focusr status")?;
    writeln!(writer, "Database: {}", database_path.display())?;
    writeln!(writer, "Managed domains: {}", statuses.len())?;
    if locked.is_empty() {
        writeln!(writer, "Locked today: none")?;
    } else {
        writeln!(writer, "Locked today: {}", locked.join(", "))?;
    }

    let documents = store.documents()?;
    if documents.is_empty() {
        writeln!(writer, "No documents stored.")?;
        return Ok(());
    }

    writeln!(writer, "Documents:")?;
    for doc in documents {
        writeln!(writer, "- {}: {} bytes, updated {}", doc.key, doc.bytes, doc.updated_at)?;
    }
    Ok(())
}
