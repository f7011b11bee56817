//! Bookmark commands.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, FixedOffset};

use fr_core::{BookmarkId, Bookmarks, DocumentStore};

pub fn list<W, S>(writer: &mut W, bookmarks: &Bookmarks<S>, json: bool) -> Result<()>
where
    W: Write,
    S: DocumentStore,
{
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(bookmarks.items())?)?;
        return Ok(());
    }

    if bookmarks.items().is_empty() {
        writeln!(writer, "No bookmarks.")?;
        return Ok(());
    }

    for bookmark in bookmarks.items() {
        let folder = bookmark
            .folder
            .as_deref()
            .map(|f| format!(" [{f}]"))
            .unwrap_or_default();
        writeln!(writer, "{}  {}{folder}  {}", bookmark.id, bookmark.title, bookmark.url)?;
    }
    Ok(())
}

pub fn add<W, S>(
    writer: &mut W,
    bookmarks: &mut Bookmarks<S>,
    url: &str,
    title: Option<&str>,
    folder: Option<&str>,
    now: DateTime<FixedOffset>,
) -> Result<()>
where
    W: Write,
    S: DocumentStore,
{
    let id = bookmarks
        .add(title.unwrap_or(""), url, folder, now)
        .context("failed to add bookmark")?;
    writeln!(writer, "Bookmarked {}: {id}", url.trim())?;
    Ok(())
}

pub fn remove<W, S>(writer: &mut W, bookmarks: &mut Bookmarks<S>, id: &str) -> Result<()>
where
    W: Write,
    S: DocumentStore,
{
    let id: BookmarkId = id.parse()?;
    if !bookmarks.remove(id).context("failed to save bookmarks")? {
        bail!("no bookmark with id {id}");
    }
    writeln!(writer, "Removed bookmark {id}")?;
    Ok(())
}
