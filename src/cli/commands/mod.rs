//! Command implementations.

pub mod cleanup;
pub mod jobs;
pub mod schedule;
pub mod search;

use crate::core::cleanup::CleanupEngine;
use crate::models::config::Config;
use crate::models::report::{JobReport, TaskStatus};
use crate::services::plex::PlexConfig;
use crate::services::radarr::RadarrConfig;
use crate::services::sonarr::SonarrConfig;
use crate::services::{
    EpisodeMonitor, MediaServer, MovieMonitor, PlexClient, PlexVariantCleaner,
    PlexWatchlistClient, RadarrClient, SonarrClient, VariantCleanup, WatchlistService,
};
use crate::Result;
use colored::Colorize;
use std::sync::Arc;

/// Wire the engine's collaborators from configuration. Missing Plex
/// configuration is the only hard failure; Radarr/Sonarr are optional.
pub fn build_engine(config: &Config) -> Result<CleanupEngine> {
    config.validate()?;

    let plex_config = PlexConfig {
        base_url: config.plex.base_url.clone().unwrap_or_default(),
        token: config.plex.token.clone().unwrap_or_default(),
    };
    let plex_client = Arc::new(PlexClient::new(plex_config.clone()));
    let variants = Arc::new(PlexVariantCleaner::new(
        plex_config.clone(),
        Arc::clone(&plex_client),
    )) as Arc<dyn VariantCleanup>;
    let watchlist =
        Arc::new(PlexWatchlistClient::new(plex_config.token.clone())) as Arc<dyn WatchlistService>;

    let radarr = if config.radarr.is_configured() {
        Some(Arc::new(RadarrClient::new(RadarrConfig {
            base_url: config.radarr.base_url.clone().unwrap_or_default(),
            api_key: config.radarr.api_key.clone().unwrap_or_default(),
        })) as Arc<dyn MovieMonitor>)
    } else {
        None
    };
    let sonarr = if config.sonarr.is_configured() {
        Some(Arc::new(SonarrClient::new(SonarrConfig {
            base_url: config.sonarr.base_url.clone().unwrap_or_default(),
            api_key: config.sonarr.api_key.clone().unwrap_or_default(),
        })) as Arc<dyn EpisodeMonitor>)
    } else {
        None
    };

    Ok(CleanupEngine::new(
        plex_client as Arc<dyn MediaServer>,
        variants,
        watchlist,
        radarr,
        sonarr,
        config.cleanup.clone(),
    ))
}

/// Render a finished report to the terminal.
pub fn print_report(report: &JobReport) {
    println!();
    println!("{}", report.headline.bold());
    println!();

    for task in &report.tasks {
        let status = match task.status {
            TaskStatus::Success => "ok".green(),
            TaskStatus::Skipped => "skipped".yellow(),
            TaskStatus::Failed => "failed".red(),
        };
        println!("{} [{}]", task.title.bold(), status);
        for fact in &task.facts {
            println!("  {}: {}", fact.label, fact.value);
        }
        for issue in &task.issues {
            println!("  {} {}", "!".yellow(), issue.message);
        }
        println!();
    }

    if !report.issues.is_empty() {
        println!("{}", "Issues:".bold().yellow());
        for issue in &report.issues {
            println!("  - {}", issue.message);
        }
        println!();
    }
}
