//! Search command implementation: kick off missing-content searches in the
//! monitoring backends.

use crate::models::config::load_config;
use crate::services::radarr::RadarrConfig;
use crate::services::sonarr::SonarrConfig;
use crate::services::{EpisodeMonitor, MovieMonitor, RadarrClient, SonarrClient};
use crate::{Error, Result};
use colored::Colorize;

pub async fn run_search(movies: bool, episodes: bool) -> Result<()> {
    if !movies && !episodes {
        return Err(Error::Config(
            "pass --movies and/or --episodes".to_string(),
        ));
    }
    let config = load_config();

    if movies {
        if !config.radarr.is_configured() {
            return Err(Error::Config("Radarr is not configured".to_string()));
        }
        let client = RadarrClient::new(RadarrConfig {
            base_url: config.radarr.base_url.clone().unwrap_or_default(),
            api_key: config.radarr.api_key.clone().unwrap_or_default(),
        });
        client.search_monitored_movies().await?;
        println!("{}", "Triggered missing-movies search in Radarr".green());
    }

    if episodes {
        if !config.sonarr.is_configured() {
            return Err(Error::Config("Sonarr is not configured".to_string()));
        }
        let client = SonarrClient::new(SonarrConfig {
            base_url: config.sonarr.base_url.clone().unwrap_or_default(),
            api_key: config.sonarr.api_key.clone().unwrap_or_default(),
        });
        client.search_monitored_episodes().await?;
        println!("{}", "Triggered missing-episodes search in Sonarr".green());
    }

    Ok(())
}
