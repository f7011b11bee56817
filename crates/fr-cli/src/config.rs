//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use fr_core::browser::{BrowserOptions, DEFAULT_HOME_URL};
use fr_core::focus::FocusDurations;
use fr_core::library::DEFAULT_HISTORY_LIMIT;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Focus interval length in minutes.
    pub focus_minutes: u32,
    /// Break length in minutes.
    pub rest_minutes: u32,
    /// Page opened by "home".
    pub home_url: String,
    /// Search endpoint for address bar queries.
    pub search_url: String,
    /// Whether to show notifications.
    pub notifications: bool,
    /// Maximum history entries kept.
    pub history_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("focusr.db"),
            focus_minutes: 25,
            rest_minutes: 5,
            home_url: DEFAULT_HOME_URL.to_string(),
            search_url: fr_core::address::DEFAULT_SEARCH_URL.to_string(),
            notifications: true,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (FOCUSR_*)
        figment = figment.merge(Env::prefixed("FOCUSR_"));

        figment.extract()
    }

    /// Focus and break lengths.
    pub fn durations(&self) -> FocusDurations {
        FocusDurations::from_minutes(self.focus_minutes, self.rest_minutes)
    }

    /// Settings for the browser controller.
    pub fn browser_options(&self) -> BrowserOptions {
        BrowserOptions {
            home_url: self.home_url.clone(),
            search_url: self.search_url.clone(),
        }
    }
}

/// Returns the platform-specific config directory for focusr.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("focusr"))
}

/// Returns the platform-specific data directory for focusr.
///
/// On Linux: `~/.local/share/focusr`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("focusr"))
}
