//! Configuration model.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Plex server configuration.
    #[serde(default)]
    pub plex: PlexConfig,
    /// Radarr configuration.
    #[serde(default)]
    pub radarr: ArrConfig,
    /// Sonarr configuration.
    #[serde(default)]
    pub sonarr: ArrConfig,
    /// Cleanup behavior.
    #[serde(default)]
    pub cleanup: CleanupConfig,
    /// Directory holding job run records.
    #[serde(default = "default_runs_dir")]
    pub runs_dir: PathBuf,
}

/// Plex server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlexConfig {
    /// Base URL, e.g. `http://localhost:32400`.
    pub base_url: Option<String>,
    /// X-Plex-Token. Usually supplied via `CURATARR_PLEX_TOKEN`.
    pub token: Option<String>,
}

/// Radarr/Sonarr endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ArrConfig {
    /// Base URL, e.g. `http://localhost:7878`.
    pub base_url: Option<String>,
    /// API key. Usually supplied via env.
    pub api_key: Option<String>,
}

impl ArrConfig {
    /// Whether this integration has enough configuration to be used at all.
    pub fn is_configured(&self) -> bool {
        self.base_url.is_some() && self.api_key.is_some()
    }
}

/// How the duplicate resolver breaks ties between copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeletePreference {
    /// Delete the newest copy (keep the oldest).
    Newest,
    /// Delete the oldest copy (keep the newest).
    Oldest,
    /// Delete the largest file (keep the smallest).
    LargestFile,
    /// Delete the smallest file (keep the largest).
    SmallestFile,
    /// No stated preference; resolution and size decide.
    #[default]
    None,
}

/// Cleanup behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupConfig {
    /// Delete duplicate media copies in Plex.
    pub delete_duplicates: bool,
    /// Flip monitor flags in Radarr/Sonarr.
    pub unmonitor_in_arr: bool,
    /// Remove downloaded content from the Plex watchlist.
    pub remove_from_watchlist: bool,
    /// Which duplicate copy to delete when quality does not decide.
    pub delete_preference: DeletePreference,
    /// Substrings that exempt a copy from deletion, e.g. "remux".
    pub preserve_quality_terms: Vec<String>,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            delete_duplicates: true,
            unmonitor_in_arr: true,
            remove_from_watchlist: true,
            delete_preference: DeletePreference::None,
            preserve_quality_terms: Vec::new(),
        }
    }
}

impl CleanupConfig {
    /// True if every feature flag is off.
    pub fn all_disabled(&self) -> bool {
        !self.delete_duplicates && !self.unmonitor_in_arr && !self.remove_from_watchlist
    }
}

impl Config {
    /// Validate required configuration.
    ///
    /// Missing Plex base URL/token is the only hard failure: every flow
    /// starts from the Plex library. Radarr/Sonarr being unconfigured
    /// degrades to "not connected" at run time instead.
    pub fn validate(&self) -> Result<()> {
        let has_url = self
            .plex
            .base_url
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false);
        let has_token = self
            .plex
            .token
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false);
        if !has_url || !has_token {
            return Err(Error::PlexNotConfigured);
        }
        Ok(())
    }
}

/// Get the configuration directory path.
fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("curatarr")
}

fn default_runs_dir() -> PathBuf {
    dirs_config_path().join("runs")
}

/// Load configuration from file, then apply env overrides for secrets.
pub fn load_config() -> Config {
    let config_path = dirs_config_path().join("config.toml");

    let mut config = if config_path.exists() {
        std::fs::read_to_string(&config_path)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default()
    } else {
        Config::default()
    };

    apply_env_overrides(&mut config);
    config
}

/// Environment variables win over the config file for secrets.
fn apply_env_overrides(config: &mut Config) {
    if let Ok(token) = std::env::var("CURATARR_PLEX_TOKEN") {
        config.plex.token = Some(token);
    }
    if let Ok(key) = std::env::var("CURATARR_RADARR_API_KEY") {
        config.radarr.api_key = Some(key);
    }
    if let Ok(key) = std::env::var("CURATARR_SONARR_API_KEY") {
        config.sonarr.api_key = Some(key);
    }
}
