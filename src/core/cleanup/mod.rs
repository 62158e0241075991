//! Cross-system reconciliation engine.
//!
//! One engine instance drives a per-invocation pipeline selected by the
//! [`ReconciliationRequest`] shape: a full library sweep, or a single
//! movie/show/season/episode flow. All flows share the same contracts:
//! feature flags gate whole stages, dry-run replaces every mutation with a
//! counter increment, and any single external failure is recorded and
//! skipped rather than aborting the run.

mod single;
mod sweep;

use crate::core::matching::{best_fuzzy_match, normalize_title};
use crate::error::Subsystem;
use crate::models::config::CleanupConfig;
use crate::models::media::{EpisodeKey, MediaIdentity, ReconciliationRequest, Trigger};
use crate::models::summary::{CleanupSummary, FeatureFlags, Progress};
use crate::services::{
    EpisodeMonitor, MediaServer, MovieMonitor, RadarrMovie, Section, SonarrEpisode, SonarrSeries,
    VariantCleanup, WatchlistService,
};
use crate::Result;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Per-run execution context handed to the engine by the job harness.
#[derive(Clone)]
pub struct JobContext {
    pub dry_run: bool,
    pub trigger: Trigger,
    progress_tx: Option<mpsc::UnboundedSender<Progress>>,
}

impl JobContext {
    pub fn new(dry_run: bool, trigger: Trigger) -> Self {
        Self {
            dry_run,
            trigger,
            progress_tx: None,
        }
    }

    /// Attach a live-progress channel; the harness persists every event.
    pub fn with_progress(mut self, tx: mpsc::UnboundedSender<Progress>) -> Self {
        self.progress_tx = Some(tx);
        self
    }
}

/// Per-run memoized lookups, single-writer within one run.
#[derive(Default)]
pub(crate) struct RunCaches {
    /// Show rating key -> set of owned (season, episode) keys.
    pub episode_sets: HashMap<String, HashSet<EpisodeKey>>,
    /// TVDB id -> show rating keys across every TV section.
    pub tvdb_rating_keys: HashMap<u64, Vec<String>>,
    pub tvdb_maps_loaded: bool,
    /// Sonarr series id -> its episode list.
    pub sonarr_episodes: HashMap<i64, Vec<SonarrEpisode>>,
}

/// Mutable state for one run: the summary accumulator plus caches and the
/// lazily loaded monitoring indexes.
pub(crate) struct Run {
    pub ctx: JobContext,
    pub summary: CleanupSummary,
    pub caches: RunCaches,
    pub sections: Option<Vec<Section>>,
    pub radarr_index: Option<Vec<RadarrMovie>>,
    pub sonarr_index: Option<Vec<SonarrSeries>>,
    /// Normalized movie title -> years seen in the library this run.
    /// A watchlist entry without a year matches any library year.
    pub movie_title_index: HashMap<String, HashSet<Option<i32>>>,
    pub movie_index_built: bool,
}

impl Run {
    fn new(ctx: JobContext, summary: CleanupSummary) -> Self {
        Self {
            ctx,
            summary,
            caches: RunCaches::default(),
            sections: None,
            radarr_index: None,
            sonarr_index: None,
            movie_title_index: HashMap::new(),
            movie_index_built: false,
        }
    }

    /// Append a subsystem-prefixed warning and log it.
    pub fn warn(&mut self, subsystem: Subsystem, msg: impl Into<String>) {
        let msg = format!("{}: {}", subsystem.prefix(), msg.into());
        tracing::warn!("{}", msg);
        self.summary.warnings.push(msg);
    }

    pub fn progress(&mut self, stage: &str, detail: Option<String>) {
        let progress = Progress {
            stage: stage.to_string(),
            detail,
        };
        self.summary.progress = Some(progress.clone());
        if let Some(tx) = &self.ctx.progress_tx {
            let _ = tx.send(progress);
        }
    }
}

/// The reconciliation engine.
pub struct CleanupEngine {
    pub(crate) plex: Arc<dyn MediaServer>,
    pub(crate) variants: Arc<dyn VariantCleanup>,
    pub(crate) watchlist: Arc<dyn WatchlistService>,
    /// `None` when Radarr is unconfigured; degrades to "not connected".
    pub(crate) radarr: Option<Arc<dyn MovieMonitor>>,
    /// `None` when Sonarr is unconfigured.
    pub(crate) sonarr: Option<Arc<dyn EpisodeMonitor>>,
    pub(crate) settings: CleanupConfig,
}

impl CleanupEngine {
    pub fn new(
        plex: Arc<dyn MediaServer>,
        variants: Arc<dyn VariantCleanup>,
        watchlist: Arc<dyn WatchlistService>,
        radarr: Option<Arc<dyn MovieMonitor>>,
        sonarr: Option<Arc<dyn EpisodeMonitor>>,
        settings: CleanupConfig,
    ) -> Self {
        Self {
            plex,
            variants,
            watchlist,
            radarr,
            sonarr,
            settings,
        }
    }

    /// Execute one reconciliation run and return the frozen summary.
    ///
    /// Per-item external failures never abort the run; they are counted and
    /// surfaced as warnings. Only missing configuration fails hard, and that
    /// is enforced before the engine is constructed.
    pub async fn run(
        &self,
        ctx: &JobContext,
        request: ReconciliationRequest,
    ) -> Result<CleanupSummary> {
        let features = FeatureFlags {
            delete_duplicates: self.settings.delete_duplicates,
            unmonitor_in_arr: self.settings.unmonitor_in_arr,
            remove_from_watchlist: self.settings.remove_from_watchlist,
        };
        let summary = CleanupSummary::new(ctx.dry_run, ctx.trigger, request.mode(), features);
        let mut run = Run::new(ctx.clone(), summary);

        run.progress("starting", Some(request.mode().to_string()));
        self.mark_disabled_stages(&mut run);

        if self.settings.all_disabled() {
            tracing::info!("cleanup: all features disabled, nothing to do");
            run.summary.mark_skipped("no_features_enabled");
            return Ok(run.summary);
        }

        tracing::info!(
            "cleanup: start mode={} trigger={} dry_run={}",
            request.mode(),
            ctx.trigger,
            ctx.dry_run
        );

        match request {
            ReconciliationRequest::FullSweep => self.run_full_sweep(&mut run).await,
            ReconciliationRequest::Movie {
                title,
                year,
                rating_key,
                tmdb_id,
            } => {
                self.run_movie(&mut run, title, year, rating_key, tmdb_id)
                    .await
            }
            ReconciliationRequest::Show {
                title,
                rating_key,
                tvdb_id,
            } => self.run_show(&mut run, title, rating_key, tvdb_id).await,
            ReconciliationRequest::Season {
                show_title,
                show_rating_key,
                tvdb_id,
                season,
            } => {
                self.run_season(&mut run, show_title, show_rating_key, tvdb_id, season)
                    .await
            }
            ReconciliationRequest::Episode {
                show_title,
                show_rating_key,
                tvdb_id,
                season,
                episode,
            } => {
                self.run_episode(&mut run, show_title, show_rating_key, tvdb_id, season, episode)
                    .await
            }
            ReconciliationRequest::Unsupported { media_type } => {
                tracing::info!("cleanup: unsupported media type {:?}, skipping", media_type);
                run.summary.mark_skipped("unsupported_media_type");
            }
        }

        run.progress("done", None);
        tracing::info!(
            "cleanup: done mode={} failures={}",
            run.summary.mode,
            run.summary.total_failures()
        );
        Ok(run.summary)
    }

    /// Stages whose feature flag is off are marked explicitly, never
    /// silently omitted.
    fn mark_disabled_stages(&self, run: &mut Run) {
        if !self.settings.delete_duplicates {
            run.summary.duplicates.skipped_disabled = true;
        }
        if !self.settings.unmonitor_in_arr {
            run.summary.radarr.skipped_disabled = true;
            run.summary.sonarr.skipped_disabled = true;
        }
        if !self.settings.remove_from_watchlist {
            run.summary.watchlist.skipped_disabled = true;
        }
    }

    // ---- shared lookups ----------------------------------------------------

    /// Library sections, fetched once per run.
    pub(crate) async fn sections(&self, run: &mut Run) -> Vec<Section> {
        if run.sections.is_none() {
            match self.plex.list_sections().await {
                Ok(sections) => run.sections = Some(sections),
                Err(e) => {
                    run.warn(Subsystem::Plex, format!("failed to list sections: {}", e));
                    run.sections = Some(Vec::new());
                }
            }
        }
        run.sections.clone().unwrap_or_default()
    }

    /// Load the Radarr movie index once, best-effort. The index is read-only
    /// here; whether flags get flipped is the caller's concern.
    pub(crate) async fn load_radarr_index(&self, run: &mut Run) {
        if run.radarr_index.is_some() {
            return;
        }
        let Some(radarr) = &self.radarr else {
            tracing::info!("radarr: not configured, monitor sync degraded");
            return;
        };
        match radarr.list_movies().await {
            Ok(movies) => {
                tracing::info!("radarr: connected, {} movies", movies.len());
                run.summary.radarr.connected = true;
                run.radarr_index = Some(movies);
            }
            Err(e) => {
                run.warn(Subsystem::Radarr, format!("not connected: {}", e));
            }
        }
    }

    /// Load the Sonarr series index once, best-effort. The watchlist stage
    /// needs it for series resolution and completeness checks even when
    /// monitor sync is disabled, so it is never gated on that flag.
    pub(crate) async fn load_sonarr_index(&self, run: &mut Run) {
        if run.sonarr_index.is_some() {
            return;
        }
        let Some(sonarr) = &self.sonarr else {
            tracing::info!("sonarr: not configured, monitor sync degraded");
            return;
        };
        match sonarr.list_series().await {
            Ok(series) => {
                tracing::info!("sonarr: connected, {} series", series.len());
                run.summary.sonarr.connected = true;
                run.sonarr_index = Some(series);
            }
            Err(e) => {
                run.warn(Subsystem::Sonarr, format!("not connected: {}", e));
            }
        }
    }

    /// TVDB id -> show rating keys across every TV section, loaded once.
    pub(crate) async fn ensure_tvdb_maps(&self, run: &mut Run) {
        if run.caches.tvdb_maps_loaded {
            return;
        }
        let sections = self.sections(run).await;
        for section in sections.iter().filter(|s| s.is_show()) {
            match self.plex.tvdb_show_map(&section.key).await {
                Ok(map) => {
                    for (tvdb, rating_key) in map {
                        run.caches
                            .tvdb_rating_keys
                            .entry(tvdb)
                            .or_default()
                            .push(rating_key);
                    }
                }
                Err(e) => run.warn(
                    Subsystem::Plex,
                    format!("tvdb map for section {:?} failed: {}", section.title, e),
                ),
            }
        }
        run.caches.tvdb_maps_loaded = true;
    }

    /// Union of owned episode keys across several show rating keys, memoized
    /// per show. Returns the union and the number of lookup failures.
    pub(crate) async fn plex_episode_union(
        &self,
        run: &mut Run,
        rating_keys: &[String],
    ) -> (HashSet<EpisodeKey>, u32) {
        let mut union = HashSet::new();
        let mut failures = 0;
        for rating_key in rating_keys {
            if !run.caches.episode_sets.contains_key(rating_key) {
                match self.plex.episodes_set(rating_key).await {
                    Ok(set) => {
                        run.caches.episode_sets.insert(rating_key.clone(), set);
                    }
                    Err(e) => {
                        run.warn(
                            Subsystem::Plex,
                            format!("episode listing for show {} failed: {}", rating_key, e),
                        );
                        failures += 1;
                        continue;
                    }
                }
            }
            if let Some(set) = run.caches.episode_sets.get(rating_key) {
                union.extend(set.iter().copied());
            }
        }
        (union, failures)
    }

    /// Sonarr episodes for a series, memoized per run.
    pub(crate) async fn sonarr_episodes(
        &self,
        run: &mut Run,
        series_id: i64,
    ) -> Option<Vec<SonarrEpisode>> {
        if let Some(episodes) = run.caches.sonarr_episodes.get(&series_id) {
            return Some(episodes.clone());
        }
        let sonarr = self.sonarr.as_ref()?;
        match sonarr.episodes_by_series(series_id).await {
            Ok(episodes) => {
                run.caches
                    .sonarr_episodes
                    .insert(series_id, episodes.clone());
                Some(episodes)
            }
            Err(e) => {
                run.warn(
                    Subsystem::Sonarr,
                    format!("episode listing for series {} failed: {}", series_id, e),
                );
                run.summary.sonarr.failures += 1;
                None
            }
        }
    }

    /// Resolve a Sonarr series by TVDB id, then exact normalized title, then
    /// fuzzy match. Below-threshold fuzzy scores are "not found".
    pub(crate) fn resolve_sonarr_series(
        &self,
        run: &Run,
        tvdb_id: Option<u64>,
        title: Option<&str>,
    ) -> Option<SonarrSeries> {
        let index = run.sonarr_index.as_ref()?;

        if let Some(tvdb) = tvdb_id {
            if let Some(series) = index.iter().find(|s| s.tvdb_id == Some(tvdb)) {
                return Some(series.clone());
            }
        }

        let title = title?;
        let wanted = normalize_title(title);
        if let Some(series) = index.iter().find(|s| normalize_title(&s.title) == wanted) {
            return Some(series.clone());
        }

        let matched = best_fuzzy_match(title, index, |s| s.title.as_str())?;
        tracing::info!(
            "sonarr: matched by fuzzy title {:?} -> {:?}",
            title,
            matched.title
        );
        Some(matched.clone())
    }

    /// Resolve a Radarr movie by TMDB id, then exact normalized title, then
    /// fuzzy match.
    pub(crate) fn resolve_radarr_movie(
        &self,
        run: &Run,
        tmdb_id: Option<u64>,
        title: Option<&str>,
    ) -> Option<RadarrMovie> {
        let index = run.radarr_index.as_ref()?;

        if let Some(tmdb) = tmdb_id {
            if let Some(movie) = index.iter().find(|m| m.tmdb_id == Some(tmdb)) {
                return Some(movie.clone());
            }
        }

        let title = title?;
        let wanted = normalize_title(title);
        if let Some(movie) = index.iter().find(|m| normalize_title(&m.title) == wanted) {
            tracing::info!(
                "radarr: matched by normalized title {:?} -> {:?}",
                title,
                movie.title
            );
            return Some(movie.clone());
        }

        let matched = best_fuzzy_match(title, index, |m| m.title.as_str())?;
        tracing::info!(
            "radarr: matched by fuzzy title {:?} -> {:?}",
            title,
            matched.title
        );
        Some(matched.clone())
    }

    /// Unmonitor one Radarr movie, recording the distinct outcomes
    /// (not found / already unmonitored / flipped / would flip).
    pub(crate) async fn radarr_unmonitor(
        &self,
        run: &mut Run,
        tmdb_id: Option<u64>,
        title: Option<&str>,
    ) {
        if !self.settings.unmonitor_in_arr {
            return;
        }
        self.load_radarr_index(run).await;
        if run.radarr_index.is_none() {
            return;
        }
        run.summary.radarr.executed = true;

        let Some(movie) = self.resolve_radarr_movie(run, tmdb_id, title) else {
            tracing::warn!(
                "radarr: movie not found tmdb={:?} title={:?}",
                tmdb_id,
                title
            );
            run.summary.radarr.not_found += 1;
            return;
        };

        if !movie.monitored {
            tracing::info!("radarr: already unmonitored title={:?}", movie.title);
            run.summary.radarr.already_unmonitored += 1;
            return;
        }

        if run.ctx.dry_run {
            run.summary.radarr.would_unmonitor += 1;
            // Project the flip into the in-memory index so later passes
            // observe the same state a live run would.
            if let Some(index) = run.radarr_index.as_mut() {
                if let Some(entry) = index.iter_mut().find(|m| m.id == movie.id) {
                    entry.monitored = false;
                }
            }
            return;
        }

        let Some(radarr) = self.radarr.as_ref() else {
            return;
        };
        match radarr.set_movie_monitored(&movie, false).await {
            Ok(changed) => {
                if changed {
                    tracing::info!("radarr: unmonitored title={:?}", movie.title);
                    run.summary.radarr.unmonitored += 1;
                } else {
                    run.summary.radarr.already_unmonitored += 1;
                }
                // Keep the in-memory index consistent for later stages.
                if let Some(index) = run.radarr_index.as_mut() {
                    if let Some(entry) = index.iter_mut().find(|m| m.id == movie.id) {
                        entry.monitored = false;
                    }
                }
            }
            Err(e) => {
                run.warn(
                    Subsystem::Radarr,
                    format!("unmonitor failed title={:?}: {}", movie.title, e),
                );
                run.summary.radarr.failures += 1;
            }
        }
    }

    /// Flip one Sonarr episode's monitored flag, dry-run aware.
    pub(crate) async fn sonarr_set_episode(
        &self,
        run: &mut Run,
        episode: &SonarrEpisode,
        monitored: bool,
    ) {
        if episode.monitored == monitored {
            if !monitored {
                run.summary.sonarr.already_unmonitored += 1;
            }
            return;
        }

        if run.ctx.dry_run {
            if monitored {
                run.summary.sonarr.would_monitor += 1;
            } else {
                run.summary.sonarr.would_unmonitor += 1;
            }
            // Mirror the flip into the per-run cache, matching the live path.
            if let Some(cached) = run.caches.sonarr_episodes.get_mut(&episode.series_id) {
                if let Some(entry) = cached.iter_mut().find(|e| e.id == episode.id) {
                    entry.monitored = monitored;
                }
            }
            return;
        }

        let Some(sonarr) = self.sonarr.as_ref() else {
            return;
        };
        match sonarr.set_episode_monitored(episode, monitored).await {
            Ok(_) => {
                let key = EpisodeKey::new(episode.season_number, episode.episode_number);
                if monitored {
                    tracing::info!("sonarr: monitored {}", key);
                    run.summary.sonarr.monitored += 1;
                } else {
                    tracing::info!("sonarr: unmonitored {}", key);
                    run.summary.sonarr.unmonitored += 1;
                }
                if let Some(cached) = run.caches.sonarr_episodes.get_mut(&episode.series_id) {
                    if let Some(entry) = cached.iter_mut().find(|e| e.id == episode.id) {
                        entry.monitored = monitored;
                    }
                }
            }
            Err(e) => {
                run.warn(
                    Subsystem::Sonarr,
                    format!(
                        "monitor update failed S{:02}E{:02}: {}",
                        episode.season_number, episode.episode_number, e
                    ),
                );
                run.summary.sonarr.failures += 1;
            }
        }
    }

    /// Unmonitor a single season via a full-series update.
    ///
    /// The latest series object is re-fetched immediately before the write
    /// so concurrent edits to other seasons are not clobbered.
    pub(crate) async fn sonarr_unmonitor_season(
        &self,
        run: &mut Run,
        series_id: i64,
        season: u32,
    ) {
        if run.ctx.dry_run {
            run.summary.sonarr.would_unmonitor_seasons += 1;
            return;
        }
        let Some(sonarr) = self.sonarr.as_ref() else {
            return;
        };

        let mut series = match sonarr.get_series(series_id).await {
            Ok(series) => series,
            Err(e) => {
                run.warn(
                    Subsystem::Sonarr,
                    format!("series refetch {} failed: {}", series_id, e),
                );
                run.summary.sonarr.failures += 1;
                return;
            }
        };

        let Some(entry) = series.seasons.iter_mut().find(|s| s.season_number == season) else {
            run.warn(
                Subsystem::Sonarr,
                format!("season {} not present on series {}", season, series_id),
            );
            return;
        };
        if !entry.monitored {
            return;
        }
        entry.monitored = false;

        match sonarr.update_series(&series).await {
            Ok(()) => {
                tracing::info!(
                    "sonarr: unmonitored season {} of {:?}",
                    season,
                    series.title
                );
                run.summary.sonarr.seasons_unmonitored += 1;
            }
            Err(e) => {
                run.warn(
                    Subsystem::Sonarr,
                    format!("season unmonitor failed series={} s={}: {}", series_id, season, e),
                );
                run.summary.sonarr.failures += 1;
            }
        }
    }

    /// Count distinct media versions on an item, for post-delete checks.
    pub(crate) fn distinct_version_count(identity: &MediaIdentity) -> usize {
        identity
            .variants
            .iter()
            .map(|v| v.media_id)
            .collect::<HashSet<_>>()
            .len()
    }
}
