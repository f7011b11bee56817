//! Focusr CLI library.
//!
//! This crate provides the command-line host for the Focusr core: it owns the
//! store, clock, and notifier and hands them to the core components.

mod cli;
pub mod commands;
mod config;
mod notify;

pub use cli::{BookmarksAction, Cli, Commands, LimitsAction, NotesAction, SessionsAction};
pub use config::Config;
pub use notify::TerminalNotifier;
