use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use fr_cli::commands::{bookmarks, check, focus, history, limits, notes, sessions, status, visit};
use fr_cli::{
    BookmarksAction, Cli, Commands, Config, LimitsAction, NotesAction, SessionsAction,
    TerminalNotifier,
};
use fr_core::{
    BrowserController, Bookmarks, Clock, FocusDurations, FocusSession, History, Notes,
    RecordingSurface, Sessions, SystemClock, UsageLedger,
};
use fr_db::SqliteStore;

/// A controller over the store, as the browser window would build it.
fn browser(
    store: &Rc<SqliteStore>,
    config: &Config,
) -> BrowserController<RecordingSurface, Rc<SqliteStore>, SystemClock, TerminalNotifier> {
    let session =
        FocusSession::with_notifier(config.durations(), TerminalNotifier::new(config.notifications));
    BrowserController::new(
        RecordingSurface::new(),
        UsageLedger::load(Rc::clone(store), SystemClock),
        History::load(Rc::clone(store), config.history_limit),
        session,
        config.browser_options(),
    )
}

/// Load config and open the store, ensuring the parent directory exists.
fn open_store(config_path: Option<&Path>) -> Result<(Rc<SqliteStore>, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let store = SqliteStore::open(&config.database_path).context("failed to open database")?;
    Ok((Rc::new(store), config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // try_init: tests may have installed a subscriber already
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let mut out = std::io::stdout().lock();

    match command {
        Commands::Status => {
            let (store, config) = open_store(cli.config.as_deref())?;
            let mut ledger = UsageLedger::load(Rc::clone(&store), SystemClock);
            status::run(&mut out, &config.database_path, &store, &mut ledger)?;
        }
        Commands::Limits(action) => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            let mut ledger = UsageLedger::load(store, SystemClock);
            match action {
                LimitsAction::List { json } => limits::list(&mut out, &mut ledger, *json)?,
                LimitsAction::Add { domain, minutes } => {
                    limits::add(&mut out, &mut ledger, domain, *minutes)?;
                }
                LimitsAction::Remove { id } => limits::remove(&mut out, &mut ledger, id)?,
            }
        }
        Commands::Check { target } => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            let mut ledger = UsageLedger::load(store, SystemClock);
            check::run(&mut out, &mut ledger, target)?;
        }
        Commands::Accrue { target, minutes } => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            let mut ledger = UsageLedger::load(store, SystemClock);
            check::accrue(&mut out, &mut ledger, target, *minutes)?;
        }
        Commands::Visit { input, title } => {
            let (store, config) = open_store(cli.config.as_deref())?;
            let mut controller = browser(&store, &config);
            visit::run(&mut out, &mut controller, input, title.as_deref())?;
        }
        Commands::Focus {
            cycles,
            focus_minutes,
            rest_minutes,
        } => {
            let config = Config::load_from(cli.config.as_deref())
                .context("failed to load configuration")?;
            let durations = FocusDurations::from_minutes(
                focus_minutes.unwrap_or(config.focus_minutes),
                rest_minutes.unwrap_or(config.rest_minutes),
            );
            let session =
                FocusSession::with_notifier(durations, TerminalNotifier::new(config.notifications));
            focus::run(&mut out, session, *cycles)?;
        }
        Commands::History { clear, json, limit } => {
            let (store, config) = open_store(cli.config.as_deref())?;
            let mut items = History::load(store, config.history_limit);
            history::run(&mut out, &mut items, *clear, *json, *limit)?;
        }
        Commands::Bookmarks(action) => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            let mut saved = Bookmarks::load(store);
            match action {
                BookmarksAction::List { json } => bookmarks::list(&mut out, &saved, *json)?,
                BookmarksAction::Add { url, title, folder } => bookmarks::add(
                    &mut out,
                    &mut saved,
                    url,
                    title.as_deref(),
                    folder.as_deref(),
                    SystemClock.now(),
                )?,
                BookmarksAction::Remove { id } => bookmarks::remove(&mut out, &mut saved, id)?,
            }
        }
        Commands::Notes(action) => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            let mut saved = Notes::load(store);
            match action {
                NotesAction::List { json } => notes::list(&mut out, &saved, *json)?,
                NotesAction::Add { content, url, tags } => notes::add(
                    &mut out,
                    &mut saved,
                    content,
                    url.as_deref(),
                    tags,
                    SystemClock.now(),
                )?,
                NotesAction::Remove { id } => notes::remove(&mut out, &mut saved, id)?,
            }
        }
        Commands::Sessions(action) => {
            let (store, config) = open_store(cli.config.as_deref())?;
            let mut saved = Sessions::load(Rc::clone(&store), SystemClock);
            match action {
                SessionsAction::List { json } => sessions::list(&mut out, &saved, *json)?,
                SessionsAction::Save { name, inputs } => {
                    let mut controller = browser(&store, &config);
                    sessions::save(&mut out, &mut controller, &mut saved, name, inputs)?;
                }
                SessionsAction::Open { id } => {
                    let mut controller = browser(&store, &config);
                    sessions::open(&mut out, &mut controller, &mut saved, id)?;
                }
                SessionsAction::Remove { id } => sessions::remove(&mut out, &mut saved, id)?,
            }
        }
    }

    Ok(())
}
