//! In-memory fakes for the service collaborators, shared by the engine and
//! job-harness integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use curatarr::error::{Error, Subsystem};
use curatarr::models::config::CleanupConfig;
use curatarr::models::media::{EpisodeKey, MediaVariant, WatchlistEntry, WatchlistKind};
use curatarr::core::cleanup::CleanupEngine;
use curatarr::core::matching::normalize_title;
use curatarr::services::{
    EpisodeMonitor, EpisodeListing, MediaServer, MetadataDetails, MovieListing, MovieMonitor,
    RadarrMovie, Section, ShowListing, SonarrEpisode, SonarrSeason, SonarrSeries, VariantCleanup,
    VariantCleanupOutcome, VariantCleanupRequest, WatchlistService,
};
use curatarr::Result;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

// ---- builders --------------------------------------------------------------

pub fn variant(media_id: i64, resolution: &str, size_gb: u64) -> MediaVariant {
    MediaVariant {
        media_id: Some(media_id),
        video_resolution: Some(resolution.to_string()),
        size_bytes: Some(size_gb * 1_000_000_000),
        file_path: Some(format!("/media/file-{}.mkv", media_id)),
    }
}

pub fn movie_details(
    rating_key: &str,
    title: &str,
    year: i32,
    tmdb: u64,
    added_at: i64,
    variants: Vec<MediaVariant>,
) -> MetadataDetails {
    MetadataDetails {
        rating_key: rating_key.to_string(),
        title: title.to_string(),
        year: Some(year),
        added_at: Some(added_at),
        tmdb_ids: vec![tmdb],
        tvdb_ids: Vec::new(),
        grandparent_title: None,
        grandparent_rating_key: None,
        parent_index: None,
        index: None,
        library_section_key: Some("1".to_string()),
        library_section_title: Some("Movies".to_string()),
        variants,
    }
}

pub fn episode_details(
    rating_key: &str,
    show: &str,
    season: u32,
    episode: u32,
    variants: Vec<MediaVariant>,
) -> MetadataDetails {
    MetadataDetails {
        rating_key: rating_key.to_string(),
        title: format!("{} S{:02}E{:02}", show, season, episode),
        year: None,
        added_at: Some(0),
        tmdb_ids: Vec::new(),
        tvdb_ids: Vec::new(),
        grandparent_title: Some(show.to_string()),
        grandparent_rating_key: None,
        parent_index: Some(season),
        index: Some(episode),
        library_section_key: Some("2".to_string()),
        library_section_title: Some("TV".to_string()),
        variants,
    }
}

pub fn radarr_movie(id: i64, title: &str, tmdb: u64, monitored: bool) -> RadarrMovie {
    RadarrMovie {
        id,
        title: title.to_string(),
        tmdb_id: Some(tmdb),
        year: None,
        monitored,
        extra: serde_json::Map::new(),
    }
}

pub fn sonarr_series(id: i64, title: &str, tvdb: u64, monitored: bool) -> SonarrSeries {
    SonarrSeries {
        id,
        title: title.to_string(),
        tvdb_id: Some(tvdb),
        monitored,
        seasons: Vec::new(),
        extra: serde_json::Map::new(),
    }
}

pub fn sonarr_season(number: u32, monitored: bool) -> SonarrSeason {
    SonarrSeason {
        season_number: number,
        monitored,
        extra: serde_json::Map::new(),
    }
}

pub fn sonarr_episode(
    id: i64,
    series_id: i64,
    season: u32,
    episode: u32,
    monitored: bool,
) -> SonarrEpisode {
    SonarrEpisode {
        id,
        series_id,
        season_number: season,
        episode_number: episode,
        monitored,
        title: None,
        extra: serde_json::Map::new(),
    }
}

pub fn watchlist_entry(rating_key: &str, title: &str, year: Option<i32>, kind: WatchlistKind) -> WatchlistEntry {
    WatchlistEntry {
        rating_key: rating_key.to_string(),
        title: title.to_string(),
        year,
        kind,
    }
}

// ---- Plex ------------------------------------------------------------------

#[derive(Default)]
pub struct MockPlex {
    pub sections: Vec<Section>,
    /// Section key -> movie listings. Mutable so deletes are reflected in
    /// subsequent listings, the way the real server behaves.
    pub movies: Mutex<HashMap<String, Vec<MovieListing>>>,
    pub duplicate_movies: Mutex<HashMap<String, Vec<String>>>,
    pub duplicate_episodes: HashMap<String, Vec<String>>,
    pub shows: HashMap<String, Vec<ShowListing>>,
    /// Show rating key -> episode listings.
    pub episodes: HashMap<String, Vec<EpisodeListing>>,
    pub details: Mutex<HashMap<String, MetadataDetails>>,
    /// Section key -> tvdb map.
    pub tvdb_maps: HashMap<String, HashMap<u64, String>>,
    pub deleted: Mutex<Vec<String>>,
    /// Delay on section listing, to hold a run open in concurrency tests.
    pub delay_ms: u64,
}

impl MockPlex {
    pub fn insert_details(&self, details: MetadataDetails) {
        self.details
            .lock()
            .unwrap()
            .insert(details.rating_key.clone(), details);
    }

    pub fn movie_section() -> Section {
        Section {
            key: "1".to_string(),
            title: "Movies".to_string(),
            kind: "movie".to_string(),
        }
    }

    pub fn show_section() -> Section {
        Section {
            key: "2".to_string(),
            title: "TV".to_string(),
            kind: "show".to_string(),
        }
    }
}

#[async_trait]
impl MediaServer for MockPlex {
    async fn list_sections(&self) -> Result<Vec<Section>> {
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        Ok(self.sections.clone())
    }

    async fn list_movies(
        &self,
        section_key: &str,
        duplicate_only: bool,
    ) -> Result<Vec<MovieListing>> {
        let listings = self
            .movies
            .lock()
            .unwrap()
            .get(section_key)
            .cloned()
            .unwrap_or_default();
        if !duplicate_only {
            return Ok(listings);
        }
        let dups = self
            .duplicate_movies
            .lock()
            .unwrap()
            .get(section_key)
            .cloned()
            .unwrap_or_default();
        Ok(listings
            .into_iter()
            .filter(|l| dups.contains(&l.rating_key))
            .collect())
    }

    async fn list_duplicate_movie_rating_keys(&self, section_key: &str) -> Result<Vec<String>> {
        Ok(self
            .duplicate_movies
            .lock()
            .unwrap()
            .get(section_key)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_duplicate_episode_rating_keys(&self, section_key: &str) -> Result<Vec<String>> {
        Ok(self
            .duplicate_episodes
            .get(section_key)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_tv_shows(&self, section_key: &str) -> Result<Vec<ShowListing>> {
        Ok(self.shows.get(section_key).cloned().unwrap_or_default())
    }

    async fn list_episodes_for_show(
        &self,
        show_rating_key: &str,
        duplicate_only: bool,
    ) -> Result<Vec<EpisodeListing>> {
        if duplicate_only {
            return Ok(Vec::new());
        }
        Ok(self
            .episodes
            .get(show_rating_key)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_metadata_details(&self, rating_key: &str) -> Result<MetadataDetails> {
        self.details
            .lock()
            .unwrap()
            .get(rating_key)
            .cloned()
            .ok_or_else(|| Error::service(Subsystem::Plex, format!("{} not found", rating_key)))
    }

    async fn delete_metadata(&self, rating_key: &str) -> Result<()> {
        self.deleted.lock().unwrap().push(rating_key.to_string());
        self.details.lock().unwrap().remove(rating_key);
        for listings in self.movies.lock().unwrap().values_mut() {
            listings.retain(|l| l.rating_key != rating_key);
        }
        for keys in self.duplicate_movies.lock().unwrap().values_mut() {
            keys.retain(|k| k != rating_key);
        }
        Ok(())
    }

    async fn tvdb_show_map(&self, section_key: &str) -> Result<HashMap<u64, String>> {
        Ok(self
            .tvdb_maps
            .get(section_key)
            .cloned()
            .unwrap_or_default())
    }

    async fn episodes_set(&self, show_rating_key: &str) -> Result<HashSet<EpisodeKey>> {
        Ok(self
            .episodes
            .get(show_rating_key)
            .map(|eps| {
                eps.iter()
                    .filter_map(|e| match (e.season, e.episode) {
                        (Some(s), Some(ep)) => Some(EpisodeKey::new(s, ep)),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_movie_rating_key_by_title(
        &self,
        section_key: &str,
        title: &str,
    ) -> Result<Option<String>> {
        let wanted = normalize_title(title);
        Ok(self
            .movies
            .lock()
            .unwrap()
            .get(section_key)
            .and_then(|listings| {
                listings
                    .iter()
                    .find(|l| normalize_title(&l.title) == wanted)
                    .map(|l| l.rating_key.clone())
            }))
    }
}

// ---- variant cleanup -------------------------------------------------------

#[derive(Default)]
pub struct MockVariants {
    pub calls: Mutex<Vec<String>>,
}

#[async_trait]
impl VariantCleanup for MockVariants {
    async fn cleanup_movie_variants(
        &self,
        request: &VariantCleanupRequest,
    ) -> Result<VariantCleanupOutcome> {
        self.calls.lock().unwrap().push(request.rating_key.clone());
        Ok(empty_outcome(&request.rating_key))
    }

    async fn cleanup_episode_variants(
        &self,
        rating_key: &str,
        _dry_run: bool,
    ) -> Result<VariantCleanupOutcome> {
        self.calls.lock().unwrap().push(rating_key.to_string());
        Ok(empty_outcome(rating_key))
    }
}

fn empty_outcome(rating_key: &str) -> VariantCleanupOutcome {
    VariantCleanupOutcome {
        title: String::new(),
        rating_key: rating_key.to_string(),
        deleted: 0,
        would_delete: 0,
        deletions: Vec::new(),
        tmdb_ids: Vec::new(),
        year: None,
    }
}

// ---- watchlist -------------------------------------------------------------

#[derive(Default)]
pub struct MockWatchlist {
    pub entries: Mutex<Vec<WatchlistEntry>>,
    pub removed: Mutex<Vec<String>>,
}

#[async_trait]
impl WatchlistService for MockWatchlist {
    async fn list_watchlist(&self, kind: WatchlistKind) -> Result<Vec<WatchlistEntry>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect())
    }

    async fn remove_by_rating_key(&self, rating_key: &str) -> Result<bool> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|e| e.rating_key != rating_key);
        if entries.len() < before {
            self.removed.lock().unwrap().push(rating_key.to_string());
            return Ok(true);
        }
        Ok(false)
    }

    async fn remove_movie_by_title(
        &self,
        title: &str,
        year: Option<i32>,
        dry_run: bool,
    ) -> Result<bool> {
        self.remove_matching(WatchlistKind::Movie, title, year, dry_run)
    }

    async fn remove_show_by_title(&self, title: &str, dry_run: bool) -> Result<bool> {
        self.remove_matching(WatchlistKind::Show, title, None, dry_run)
    }
}

impl MockWatchlist {
    fn remove_matching(
        &self,
        kind: WatchlistKind,
        title: &str,
        year: Option<i32>,
        dry_run: bool,
    ) -> Result<bool> {
        let wanted = normalize_title(title);
        let mut entries = self.entries.lock().unwrap();
        let matched: Vec<String> = entries
            .iter()
            .filter(|e| {
                e.kind == kind
                    && normalize_title(&e.title) == wanted
                    && (year.is_none() || e.year.is_none() || e.year == year)
            })
            .map(|e| e.rating_key.clone())
            .collect();
        if matched.is_empty() {
            return Ok(false);
        }
        if dry_run {
            return Ok(true);
        }
        entries.retain(|e| !matched.contains(&e.rating_key));
        self.removed.lock().unwrap().extend(matched);
        Ok(true)
    }
}

// ---- Radarr ----------------------------------------------------------------

#[derive(Default)]
pub struct MockRadarr {
    pub movies: Mutex<Vec<RadarrMovie>>,
}

#[async_trait]
impl MovieMonitor for MockRadarr {
    async fn list_movies(&self) -> Result<Vec<RadarrMovie>> {
        Ok(self.movies.lock().unwrap().clone())
    }

    async fn set_movie_monitored(&self, movie: &RadarrMovie, monitored: bool) -> Result<bool> {
        let mut movies = self.movies.lock().unwrap();
        let Some(entry) = movies.iter_mut().find(|m| m.id == movie.id) else {
            return Err(Error::service(Subsystem::Radarr, "movie not found"));
        };
        if entry.monitored == monitored {
            return Ok(false);
        }
        entry.monitored = monitored;
        Ok(true)
    }

    async fn search_monitored_movies(&self) -> Result<()> {
        Ok(())
    }
}

// ---- Sonarr ----------------------------------------------------------------

#[derive(Default)]
pub struct MockSonarr {
    pub series: Mutex<Vec<SonarrSeries>>,
    pub episodes: Mutex<Vec<SonarrEpisode>>,
}

#[async_trait]
impl EpisodeMonitor for MockSonarr {
    async fn list_series(&self) -> Result<Vec<SonarrSeries>> {
        Ok(self.series.lock().unwrap().clone())
    }

    async fn get_series(&self, series_id: i64) -> Result<SonarrSeries> {
        self.series
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == series_id)
            .cloned()
            .ok_or_else(|| Error::service(Subsystem::Sonarr, "series not found"))
    }

    async fn episodes_by_series(&self, series_id: i64) -> Result<Vec<SonarrEpisode>> {
        Ok(self
            .episodes
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.series_id == series_id)
            .cloned()
            .collect())
    }

    async fn set_episode_monitored(
        &self,
        episode: &SonarrEpisode,
        monitored: bool,
    ) -> Result<bool> {
        let mut episodes = self.episodes.lock().unwrap();
        let Some(entry) = episodes.iter_mut().find(|e| e.id == episode.id) else {
            return Err(Error::service(Subsystem::Sonarr, "episode not found"));
        };
        if entry.monitored == monitored {
            return Ok(false);
        }
        entry.monitored = monitored;
        Ok(true)
    }

    async fn update_series(&self, series: &SonarrSeries) -> Result<()> {
        let mut all = self.series.lock().unwrap();
        let Some(entry) = all.iter_mut().find(|s| s.id == series.id) else {
            return Err(Error::service(Subsystem::Sonarr, "series not found"));
        };
        *entry = series.clone();
        Ok(())
    }

    async fn search_monitored_episodes(&self) -> Result<()> {
        Ok(())
    }
}

// ---- engine wiring ---------------------------------------------------------

pub fn build_engine(
    plex: Arc<MockPlex>,
    variants: Arc<MockVariants>,
    watchlist: Arc<MockWatchlist>,
    radarr: Option<Arc<MockRadarr>>,
    sonarr: Option<Arc<MockSonarr>>,
    settings: CleanupConfig,
) -> CleanupEngine {
    CleanupEngine::new(
        plex,
        variants,
        watchlist,
        radarr.map(|r| r as Arc<dyn MovieMonitor>),
        sonarr.map(|s| s as Arc<dyn EpisodeMonitor>),
        settings,
    )
}
