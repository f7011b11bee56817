//! Note commands.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, FixedOffset};

use fr_core::{DocumentStore, NoteId, Notes};

pub fn list<W, S>(writer: &mut W, notes: &Notes<S>, json: bool) -> Result<()>
where
    W: Write,
    S: DocumentStore,
{
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(notes.items())?)?;
        return Ok(());
    }

    if notes.items().is_empty() {
        writeln!(writer, "No notes.")?;
        return Ok(());
    }

    for note in notes.items() {
        let mut line = format!("{}  {}", note.id, note.content);
        if !note.tags.is_empty() {
            line.push_str(&format!(" [{}]", note.tags.join(", ")));
        }
        if let Some(url) = &note.source_url {
            line.push_str(&format!("  <{url}>"));
        }
        writeln!(writer, "{line}")?;
    }
    Ok(())
}

pub fn add<W, S>(
    writer: &mut W,
    notes: &mut Notes<S>,
    content: &str,
    source_url: Option<&str>,
    tags: &[String],
    now: DateTime<FixedOffset>,
) -> Result<()>
where
    W: Write,
    S: DocumentStore,
{
    let id = notes
        .add(content, source_url, tags, now)
        .context("failed to add note")?;
    writeln!(writer, "Noted: {id}")?;
    Ok(())
}

pub fn remove<W, S>(writer: &mut W, notes: &mut Notes<S>, id: &str) -> Result<()>
where
    W: Write,
    S: DocumentStore,
{
    let id: NoteId = id.parse()?;
    if !notes.remove(id).context("failed to save notes")? {
        bail!("no note with id {id}");
    }
    writeln!(writer, "Removed note {id}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use fr_core::MemoryStore;

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_add_list_remove() {
        let store = MemoryStore::new();
        let mut notes = Notes::load(&store);
        let tags = vec!["rust".to_string(), "async".to_string()];

        add(&mut Vec::new(), &mut notes, "pin before polling", Some("https://docs.rs/tokio"), &tags, now())
            .unwrap();
        add(&mut Vec::new(), &mut notes, "call the bank", None, &[], now()).unwrap();

        let mut listing = Vec::new();
        list(&mut listing, &notes, false).unwrap();
        let listing = notes
            .items()
            .iter()
            .fold(String::from_utf8(listing).unwrap(), |out, n| out.replace(&n.id.to_string(), "[ID]"));
        insta::assert_snapshot!(listing, @r"
        [ID]  pin before polling [rust, async]  <https://docs.rs/tokio>
        [ID]  call the bank
        ");

        let id = notes.items()[1].id.to_string();
        let mut output = Vec::new();
        remove(&mut output, &mut notes, &id).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), format!("Removed note {id}\n"));
        let err = remove(&mut Vec::new(), &mut notes, &id).unwrap_err();
        assert_eq!(err.to_string(), format!("no note with id {id}"));
    }

    #[test]
    fn test_blank_note_is_rejected() {
        let store = MemoryStore::new();
        let mut notes = Notes::load(&store);
        let err = add(&mut Vec::new(), &mut notes, "  ", None, &[], now()).unwrap_err();
        assert_eq!(format!("{err:#}"), "failed to add note: note cannot be empty");

        let mut output = Vec::new();
        list(&mut output, &notes, false).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "No notes.\n");
    }
}
