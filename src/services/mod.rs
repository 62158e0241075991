//! External service collaborators.
//!
//! Each collaborator is a reqwest-backed client behind an async trait so the
//! reconciliation engine can be exercised against in-memory fakes in tests.

pub mod plex;
pub mod plex_variants;
pub mod plex_watchlist;
pub mod radarr;
pub mod sonarr;

use crate::models::media::{EpisodeKey, WatchlistEntry, WatchlistKind};
use crate::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

pub use plex::{EpisodeListing, MetadataDetails, MovieListing, PlexClient, Section, ShowListing};
pub use plex_variants::{PlexVariantCleaner, VariantCleanupOutcome, VariantCleanupRequest};
pub use plex_watchlist::PlexWatchlistClient;
pub use radarr::{RadarrClient, RadarrMovie};
pub use sonarr::{SonarrClient, SonarrEpisode, SonarrSeason, SonarrSeries};

/// Media-server collaborator (Plex library surface).
#[async_trait]
pub trait MediaServer: Send + Sync {
    async fn list_sections(&self) -> Result<Vec<Section>>;
    /// List movies in a section, optionally restricted to duplicate-flagged
    /// items. Entries without a TMDB id are still returned; callers filter.
    async fn list_movies(&self, section_key: &str, duplicate_only: bool)
        -> Result<Vec<MovieListing>>;
    async fn list_duplicate_movie_rating_keys(&self, section_key: &str) -> Result<Vec<String>>;
    async fn list_duplicate_episode_rating_keys(&self, section_key: &str) -> Result<Vec<String>>;
    async fn list_tv_shows(&self, section_key: &str) -> Result<Vec<ShowListing>>;
    async fn list_episodes_for_show(
        &self,
        show_rating_key: &str,
        duplicate_only: bool,
    ) -> Result<Vec<EpisodeListing>>;
    async fn get_metadata_details(&self, rating_key: &str) -> Result<MetadataDetails>;
    async fn delete_metadata(&self, rating_key: &str) -> Result<()>;
    /// Map TVDB id -> show rating key for one TV section.
    async fn tvdb_show_map(&self, section_key: &str) -> Result<HashMap<u64, String>>;
    /// Set of owned (season, episode) keys for one show.
    async fn episodes_set(&self, show_rating_key: &str) -> Result<HashSet<EpisodeKey>>;
    async fn find_movie_rating_key_by_title(
        &self,
        section_key: &str,
        title: &str,
    ) -> Result<Option<String>>;
}

/// Intra-item duplicate-variant collaborator: cleans up multiple media
/// versions attached to a single catalog entry.
#[async_trait]
pub trait VariantCleanup: Send + Sync {
    async fn cleanup_movie_variants(
        &self,
        request: &VariantCleanupRequest,
    ) -> Result<VariantCleanupOutcome>;
    async fn cleanup_episode_variants(
        &self,
        rating_key: &str,
        dry_run: bool,
    ) -> Result<VariantCleanupOutcome>;
}

/// Watchlist collaborator.
#[async_trait]
pub trait WatchlistService: Send + Sync {
    async fn list_watchlist(&self, kind: WatchlistKind) -> Result<Vec<WatchlistEntry>>;
    /// Returns true if an entry was removed.
    async fn remove_by_rating_key(&self, rating_key: &str) -> Result<bool>;
    async fn remove_movie_by_title(
        &self,
        title: &str,
        year: Option<i32>,
        dry_run: bool,
    ) -> Result<bool>;
    async fn remove_show_by_title(&self, title: &str, dry_run: bool) -> Result<bool>;
}

/// Movie-monitoring collaborator (Radarr).
#[async_trait]
pub trait MovieMonitor: Send + Sync {
    async fn list_movies(&self) -> Result<Vec<RadarrMovie>>;
    /// Returns true if the flag actually changed.
    async fn set_movie_monitored(&self, movie: &RadarrMovie, monitored: bool) -> Result<bool>;
    /// Trigger a search for all monitored movies (used by a separate job).
    async fn search_monitored_movies(&self) -> Result<()>;
}

/// Episode-monitoring collaborator (Sonarr).
#[async_trait]
pub trait EpisodeMonitor: Send + Sync {
    async fn list_series(&self) -> Result<Vec<SonarrSeries>>;
    /// Re-fetch one series; used immediately before a seasons-array update.
    async fn get_series(&self, series_id: i64) -> Result<SonarrSeries>;
    async fn episodes_by_series(&self, series_id: i64) -> Result<Vec<SonarrEpisode>>;
    async fn set_episode_monitored(&self, episode: &SonarrEpisode, monitored: bool)
        -> Result<bool>;
    async fn update_series(&self, series: &SonarrSeries) -> Result<()>;
    /// Trigger a search for all monitored episodes (used by a separate job).
    async fn search_monitored_episodes(&self) -> Result<()>;
}
