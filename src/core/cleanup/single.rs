//! Single-item flows: one movie, show, season or episode, typically driven
//! by a library webhook right after an import.

use super::{CleanupEngine, Run};
use crate::error::Subsystem;
use crate::models::media::EpisodeKey;
use crate::services::SonarrSeries;

/// Result of one bidirectional episode-monitor sync.
pub(crate) struct SyncOutcome {
    /// Every non-special episode of the series is in the library.
    pub series_complete: bool,
    /// Every non-special episode of the scoped season is in the library.
    /// Equals `series_complete` when the sync was unscoped.
    pub season_complete: bool,
}

impl CleanupEngine {
    // ---- movie -------------------------------------------------------------

    pub(crate) async fn run_movie(
        &self,
        run: &mut Run,
        title: Option<String>,
        year: Option<i32>,
        rating_key: Option<String>,
        tmdb_id: Option<u64>,
    ) {
        run.progress("movie", title.clone());
        let sections = self.sections(run).await;

        let mut rating_key = rating_key;
        if rating_key.is_none() {
            if let Some(title) = &title {
                for section in sections.iter().filter(|s| s.is_movie()) {
                    match self
                        .plex
                        .find_movie_rating_key_by_title(&section.key, title)
                        .await
                    {
                        Ok(Some(found)) => {
                            rating_key = Some(found);
                            break;
                        }
                        Ok(None) => {}
                        Err(e) => run.warn(
                            Subsystem::Plex,
                            format!("title lookup in {:?} failed: {}", section.title, e),
                        ),
                    }
                }
            }
        }

        let mut tmdb = tmdb_id;
        let mut resolved_title = title;
        let mut resolved_year = year;
        let mut section_key = None;
        match &rating_key {
            Some(key) => match self.plex.get_metadata_details(key).await {
                Ok(details) => {
                    tmdb = tmdb.or_else(|| details.tmdb_ids.first().copied());
                    resolved_year = resolved_year.or(details.year);
                    section_key = details.library_section_key.clone();
                    if resolved_title.is_none() {
                        resolved_title = Some(details.title);
                    }
                }
                Err(e) => run.warn(Subsystem::Plex, format!("metadata {} failed: {}", key, e)),
            },
            None => run.warn(
                Subsystem::Plex,
                format!("movie {:?} not found in any library section", resolved_title),
            ),
        }

        // Duplicate cleanup sweeps the whole resolved section: an import that
        // created a duplicate may have landed under a different entry than
        // the one named in the payload.
        if self.settings.delete_duplicates {
            run.summary.duplicates.executed = true;
            if let Some(section_key) = &section_key {
                let scope: Vec<_> = sections
                    .iter()
                    .filter(|s| &s.key == section_key)
                    .cloned()
                    .collect();
                self.movie_duplicate_pass(run, &scope).await;
            } else if let Some(key) = &rating_key {
                let key = key.clone();
                self.movie_variant_cleanup(run, &key).await;
            }
        }

        self.radarr_unmonitor(run, tmdb, resolved_title.as_deref())
            .await;
        if self.settings.unmonitor_in_arr {
            run.summary.radarr.executed = true;
        }

        if self.settings.remove_from_watchlist {
            run.summary.watchlist.executed = true;
            if let Some(title) = &resolved_title {
                run.summary.watchlist.movies_checked += 1;
                match self
                    .watchlist
                    .remove_movie_by_title(title, resolved_year, run.ctx.dry_run)
                    .await
                {
                    Ok(true) => {
                        if run.ctx.dry_run {
                            run.summary.watchlist.would_remove += 1;
                        } else {
                            run.summary.watchlist.removed += 1;
                        }
                    }
                    Ok(false) => run.summary.watchlist.not_found += 1,
                    Err(e) => {
                        run.warn(
                            Subsystem::Plex,
                            format!("watchlist remove {:?} failed: {}", title, e),
                        );
                        run.summary.watchlist.failures += 1;
                    }
                }
            }
        }
    }

    // ---- show --------------------------------------------------------------

    pub(crate) async fn run_show(
        &self,
        run: &mut Run,
        title: Option<String>,
        rating_key: Option<String>,
        tvdb_id: Option<u64>,
    ) {
        run.progress("show", title.clone());
        let (tvdb, show_title, section_key) = self
            .resolve_show_context(run, rating_key.as_deref(), tvdb_id, title)
            .await;

        if self.settings.delete_duplicates {
            run.summary.duplicates.executed = true;
            if let Some(section_key) = &section_key {
                let sections = self.sections(run).await;
                let scope: Vec<_> = sections
                    .iter()
                    .filter(|s| &s.key == section_key)
                    .cloned()
                    .collect();
                self.episode_duplicate_pass(run, &scope).await;
            }
        }

        self.load_sonarr_index(run).await;
        if self.settings.unmonitor_in_arr && run.sonarr_index.is_some() {
            run.summary.sonarr.executed = true;
        }

        let series = self.resolve_sonarr_series(run, tvdb, show_title.as_deref());
        let outcome = match &series {
            Some(series) => self.sync_series_episodes(run, series, None).await,
            None => {
                if run.sonarr_index.is_some() {
                    run.summary.sonarr.not_found += 1;
                }
                None
            }
        };

        let complete = outcome.map(|o| o.series_complete).unwrap_or(false);
        self.show_watchlist_check(run, show_title.as_deref(), complete)
            .await;
        if complete {
            if let Some(series) = &series {
                self.sonarr_unmonitor_series(run, series).await;
            }
        }
    }

    // ---- season ------------------------------------------------------------

    pub(crate) async fn run_season(
        &self,
        run: &mut Run,
        show_title: Option<String>,
        show_rating_key: Option<String>,
        tvdb_id: Option<u64>,
        season: u32,
    ) {
        run.progress("season", show_title.clone().map(|t| format!("{} S{:02}", t, season)));
        let (tvdb, show_title, _) = self
            .resolve_show_context(run, show_rating_key.as_deref(), tvdb_id, show_title)
            .await;

        self.load_sonarr_index(run).await;
        if self.settings.unmonitor_in_arr && run.sonarr_index.is_some() {
            run.summary.sonarr.executed = true;
        }

        let series = self.resolve_sonarr_series(run, tvdb, show_title.as_deref());
        let outcome = match &series {
            Some(series) => self.sync_series_episodes(run, series, Some(season)).await,
            None => {
                if run.sonarr_index.is_some() {
                    run.summary.sonarr.not_found += 1;
                }
                None
            }
        };

        if let Some(outcome) = &outcome {
            if outcome.season_complete {
                run.summary.sonarr.seasons_complete += 1;
            } else {
                run.summary.sonarr.seasons_incomplete += 1;
            }
        }

        if let (Some(series), Some(outcome)) = (&series, &outcome) {
            if self.settings.unmonitor_in_arr && outcome.season_complete {
                let still_monitored = series
                    .seasons
                    .iter()
                    .any(|s| s.season_number == season && s.monitored);
                if still_monitored {
                    self.sonarr_unmonitor_season(run, series.id, season).await;
                }
            }
        }

        // Watchlist removal gates on the whole series, not just this season.
        let complete = outcome.as_ref().map(|o| o.series_complete).unwrap_or(false);
        self.show_watchlist_check(run, show_title.as_deref(), complete)
            .await;
        if complete {
            if let Some(series) = &series {
                self.sonarr_unmonitor_series(run, series).await;
            }
        }
    }

    // ---- episode -----------------------------------------------------------

    /// Narrowest flow: a single imported episode gets unmonitored. No
    /// duplicate sweep, no watchlist, never re-monitors anything.
    pub(crate) async fn run_episode(
        &self,
        run: &mut Run,
        show_title: Option<String>,
        show_rating_key: Option<String>,
        tvdb_id: Option<u64>,
        season: u32,
        episode: u32,
    ) {
        let key = EpisodeKey::new(season, episode);
        run.progress(
            "episode",
            show_title.clone().map(|t| format!("{} {}", t, key)),
        );
        if !self.settings.unmonitor_in_arr {
            return;
        }

        let (tvdb, show_title, _) = self
            .resolve_show_context(run, show_rating_key.as_deref(), tvdb_id, show_title)
            .await;

        self.load_sonarr_index(run).await;
        if run.sonarr_index.is_none() {
            return;
        }
        run.summary.sonarr.executed = true;

        let Some(series) = self.resolve_sonarr_series(run, tvdb, show_title.as_deref()) else {
            tracing::warn!("sonarr: series not found for {:?}", show_title);
            run.summary.sonarr.not_found += 1;
            return;
        };
        let Some(episodes) = self.sonarr_episodes(run, series.id).await else {
            return;
        };
        let Some(target) = episodes
            .iter()
            .find(|e| e.season_number == season && e.episode_number == episode)
        else {
            tracing::warn!("sonarr: {} not found on {:?}", key, series.title);
            run.summary.sonarr.not_found += 1;
            return;
        };
        self.sonarr_set_episode(run, target, false).await;
    }

    // ---- shared ------------------------------------------------------------

    /// Fill in TVDB id, title and section key from the show's library entry
    /// when a rating key is available.
    async fn resolve_show_context(
        &self,
        run: &mut Run,
        rating_key: Option<&str>,
        tvdb_id: Option<u64>,
        title: Option<String>,
    ) -> (Option<u64>, Option<String>, Option<String>) {
        let mut tvdb = tvdb_id;
        let mut title = title;
        let mut section_key = None;

        if let Some(key) = rating_key {
            match self.plex.get_metadata_details(key).await {
                Ok(details) => {
                    tvdb = tvdb.or_else(|| details.tvdb_ids.first().copied());
                    section_key = details.library_section_key.clone();
                    if title.is_none() {
                        title = Some(details.title);
                    }
                }
                Err(e) => run.warn(Subsystem::Plex, format!("metadata {} failed: {}", key, e)),
            }
        }

        (tvdb, title, section_key)
    }

    /// Bidirectional monitor sync for one series: episodes present in the
    /// library get unmonitored, monitored gaps get re-monitored so the
    /// downloader picks them back up. `scope` limits the flag writes to one
    /// season; completeness is always computed over the whole series.
    pub(crate) async fn sync_series_episodes(
        &self,
        run: &mut Run,
        series: &SonarrSeries,
        scope: Option<u32>,
    ) -> Option<SyncOutcome> {
        let episodes = self.sonarr_episodes(run, series.id).await?;
        self.ensure_tvdb_maps(run).await;

        let show_keys = series
            .tvdb_id
            .and_then(|tvdb| run.caches.tvdb_rating_keys.get(&tvdb).cloned())
            .unwrap_or_default();
        let (owned, failures) = self.plex_episode_union(run, &show_keys).await;
        run.summary.sonarr.failures += failures;

        let mut missing_total = 0u32;
        let mut missing_scoped = 0u32;
        let mut any_nonspecial = false;
        let mut any_scoped = false;

        for episode in &episodes {
            let key = EpisodeKey::new(episode.season_number, episode.episode_number);
            if key.is_special() {
                continue;
            }
            any_nonspecial = true;
            let present = owned.contains(&key);
            let in_scope = scope.map(|s| s == key.season).unwrap_or(true);
            if in_scope {
                any_scoped = true;
            }
            if !present {
                missing_total += 1;
                if in_scope {
                    missing_scoped += 1;
                }
            }
            if self.settings.unmonitor_in_arr && in_scope {
                self.sonarr_set_episode(run, episode, !present).await;
            }
        }

        run.summary.sonarr.missing_episodes += missing_total;
        if missing_total > 0 {
            tracing::info!(
                "sonarr: {:?} missing {} episodes in library",
                series.title,
                missing_total
            );
        }

        Some(SyncOutcome {
            series_complete: any_nonspecial && missing_total == 0,
            season_complete: any_scoped && missing_scoped == 0,
        })
    }

    /// Watchlist check for a show flow. An incomplete show is checked in
    /// forced dry-run mode so the outcome is still visible without mutating.
    async fn show_watchlist_check(&self, run: &mut Run, title: Option<&str>, complete: bool) {
        if !self.settings.remove_from_watchlist {
            return;
        }
        run.summary.watchlist.executed = true;
        let Some(title) = title else {
            return;
        };
        run.summary.watchlist.shows_checked += 1;

        let effective_dry_run = run.ctx.dry_run || !complete;
        match self
            .watchlist
            .remove_show_by_title(title, effective_dry_run)
            .await
        {
            Ok(true) => {
                if !complete {
                    tracing::info!(
                        "watchlist: keeping {:?}, show incomplete in library",
                        title
                    );
                    run.summary.watchlist.incomplete_shows += 1;
                } else if run.ctx.dry_run {
                    run.summary.watchlist.would_remove += 1;
                } else {
                    run.summary.watchlist.removed += 1;
                }
            }
            Ok(false) => run.summary.watchlist.not_found += 1,
            Err(e) => {
                run.warn(
                    Subsystem::Plex,
                    format!("watchlist remove {:?} failed: {}", title, e),
                );
                run.summary.watchlist.failures += 1;
            }
        }
    }
}
