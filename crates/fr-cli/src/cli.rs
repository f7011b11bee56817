//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// A browser companion for attention-friendly browsing.
///
/// Tracks daily time per site, locks sites that hit their limit, and runs a
/// focus/break timer.
#[derive(Debug, Parser)]
#[command(name = "focusr", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show store location and today's lockouts.
    Status,

    /// Manage per-site daily limits.
    #[command(subcommand)]
    Limits(LimitsAction),

    /// Check whether a site is locked today.
    Check {
        /// URL or host name (e.g., mobile.twitter.com).
        target: String,
    },

    /// Record time spent on a site.
    Accrue {
        /// URL or host name.
        target: String,

        /// Minutes to add.
        #[arg(short, long)]
        minutes: u32,
    },

    /// Open an address the way the browser would, honouring site limits.
    Visit {
        /// Address bar input: a URL, a host, or search words.
        input: String,

        /// Page title to record in history.
        #[arg(long)]
        title: Option<String>,
    },

    /// Run a focus timer in the terminal.
    Focus {
        /// Number of focus intervals to run.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        cycles: u32,

        /// Override the configured focus length in minutes.
        #[arg(long)]
        focus_minutes: Option<u32>,

        /// Override the configured break length in minutes.
        #[arg(long)]
        rest_minutes: Option<u32>,
    },

    /// Show or clear browsing history.
    History {
        /// Delete all history.
        #[arg(long)]
        clear: bool,

        /// Output as JSON.
        #[arg(long)]
        json: bool,

        /// Maximum entries to show.
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Manage bookmarks.
    #[command(subcommand)]
    Bookmarks(BookmarksAction),

    /// Manage notes.
    #[command(subcommand)]
    Notes(NotesAction),

    /// Save and reopen sets of tabs.
    #[command(subcommand)]
    Sessions(SessionsAction),
}

/// Site limit subcommands.
#[derive(Debug, Subcommand)]
pub enum LimitsAction {
    /// List limits with today's usage.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Add a daily limit for a domain.
    Add {
        /// Domain to limit; also covers its subdomains (e.g., reddit.com).
        domain: String,

        /// Daily allowance in minutes.
        #[arg(short, long, default_value_t = 30)]
        minutes: i64,
    },
    /// Remove a limit by ID.
    Remove {
        /// Limit ID as shown by `focusr limits list`.
        id: String,
    },
}

/// Bookmark subcommands.
#[derive(Debug, Subcommand)]
pub enum BookmarksAction {
    /// List bookmarks.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Save a bookmark.
    Add {
        /// Page URL.
        url: String,

        /// Title; defaults to the URL.
        #[arg(long)]
        title: Option<String>,

        /// Folder name.
        #[arg(long)]
        folder: Option<String>,
    },
    /// Remove a bookmark by ID.
    Remove {
        /// Bookmark ID as shown by `focusr bookmarks list`.
        id: String,
    },
}

/// Note subcommands.
#[derive(Debug, Subcommand)]
pub enum NotesAction {
    /// List notes.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Write a note.
    Add {
        /// Note text.
        content: String,

        /// Page the note was taken from.
        #[arg(long)]
        url: Option<String>,

        /// Tag; repeat for more than one.
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
    /// Remove a note by ID.
    Remove {
        /// Note ID as shown by `focusr notes list`.
        id: String,
    },
}

/// Session subcommands.
#[derive(Debug, Subcommand)]
pub enum SessionsAction {
    /// List saved sessions. Sessions unopened for a week are dropped.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Open each address in its own tab and save the tabs.
    Save {
        /// Session name.
        name: String,

        /// Addresses to open, one tab each.
        #[arg(required = true)]
        inputs: Vec<String>,
    },
    /// Reopen a saved session.
    Open {
        /// Session ID as shown by `focusr sessions list`.
        id: String,
    },
    /// Remove a session by ID.
    Remove {
        /// Session ID as shown by `focusr sessions list`.
        id: String,
    },
}
