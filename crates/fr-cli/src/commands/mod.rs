//! CLI subcommand implementations.

pub mod bookmarks;
pub mod check;
pub mod focus;
pub mod history;
pub mod limits;
pub mod notes;
pub mod sessions;
pub mod status;
pub mod visit;
