//! Saved session commands.

use std::io::Write;

use anyhow::{Context, Result, bail};

use fr_core::browser::MAX_TABS;
use fr_core::{
    BrowserController, Clock, DocumentStore, NavigationOutcome, Notifier, RenderSurface, SessionId,
    Sessions, host_from_str,
};

use super::limits::describe;

pub fn list<W, S, C>(writer: &mut W, sessions: &Sessions<S, C>, json: bool) -> Result<()>
where
    W: Write,
    S: DocumentStore,
    C: Clock,
{
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(sessions.items())?)?;
        return Ok(());
    }

    if sessions.items().is_empty() {
        writeln!(writer, "No saved sessions.")?;
        return Ok(());
    }

    for session in sessions.items() {
        writeln!(
            writer,
            "{}  {}  {} tab(s), last opened {}",
            session.id,
            session.name,
            session.tabs.len(),
            session.last_accessed_at.format("%Y-%m-%d %H:%M")
        )?;
    }
    Ok(())
}

/// Opens each input in its own tab and saves the tabs as a session.
///
/// Inputs for locked sites are reported and left out.
pub fn save<W, R, S, C, N, C2>(
    writer: &mut W,
    controller: &mut BrowserController<R, S, C, N>,
    sessions: &mut Sessions<S, C2>,
    name: &str,
    inputs: &[String],
) -> Result<()>
where
    W: Write,
    R: RenderSurface,
    S: DocumentStore,
    C: Clock,
    N: Notifier,
    C2: Clock,
{
    for input in inputs {
        if controller.current_tab().url.is_some() && !controller.add_tab() {
            bail!("a session holds at most {} tabs", MAX_TABS);
        }
        match controller.navigate(input)? {
            NavigationOutcome::Loaded(url) => {
                controller.navigation_finished(&url, "");
            }
            NavigationOutcome::Blocked { host } => {
                writeln!(writer, "Skipped {host}: daily limit reached")?;
            }
        }
    }

    let session = controller.snapshot_session(name);
    let tabs = session.tabs.iter().filter(|t| t.url.is_some()).count();
    if tabs == 0 {
        bail!("nothing to save: every page was blocked");
    }
    let id = session.id;
    sessions
        .save(session)
        .with_context(|| format!("failed to save session {name:?}"))?;
    writeln!(writer, "Saved {} ({tabs} tab(s)): {id}", name.trim())?;
    Ok(())
}

/// Restores a session and lists its tabs with today's lock state.
pub fn open<W, R, S, C, N, C2>(
    writer: &mut W,
    controller: &mut BrowserController<R, S, C, N>,
    sessions: &mut Sessions<S, C2>,
    id: &str,
) -> Result<()>
where
    W: Write,
    R: RenderSurface,
    S: DocumentStore,
    C: Clock,
    N: Notifier,
    C2: Clock,
{
    let id: SessionId = id.parse()?;
    let Some(session) = sessions.open(id).context("failed to save sessions")? else {
        bail!("no session with id {id}");
    };
    controller.restore_session(&session);

    let tabs = controller.tabs().to_vec();
    writeln!(writer, "Opened {} ({} tab(s))", session.name, tabs.len())?;
    for (index, tab) in tabs.iter().enumerate() {
        let url = tab.url.as_deref().unwrap_or("");
        let lock = tab
            .url
            .as_deref()
            .and_then(host_from_str)
            .and_then(|host| controller.ledger_mut().status_for(&host))
            .filter(|status| status.locked)
            .map(|status| format!("  [{}]", describe(&status)))
            .unwrap_or_default();
        writeln!(writer, "  {}. {}  {url}{lock}", index + 1, tab.title)?;
    }
    Ok(())
}

pub fn remove<W, S, C>(writer: &mut W, sessions: &mut Sessions<S, C>, id: &str) -> Result<()>
where
    W: Write,
    S: DocumentStore,
    C: Clock,
{
    let id: SessionId = id.parse()?;
    if !sessions.remove(id).context("failed to save sessions")? {
        bail!("no session with id {id}");
    }
    writeln!(writer, "Removed session {id}")?;
    Ok(())
}
