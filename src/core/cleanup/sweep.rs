//! Full-sweep passes: whole-library duplicate cleanup, cross-library episode
//! reconciliation, watchlist pruning and the season-level monitor sync.
//!
//! Several passes here are shared with the single-item flows (a movie flow
//! runs the movie duplicate pass over just its own section).

use super::{CleanupEngine, Run};
use crate::core::matching::normalize_title;
use crate::core::resolver::resolve_group;
use crate::error::Subsystem;
use crate::models::config::DeletePreference;
use crate::models::media::{EpisodeKey, MediaIdentity, Trigger, WatchlistKind};
use crate::services::{Section, SonarrSeries, VariantCleanupRequest};
use std::collections::{HashMap, HashSet};

impl CleanupEngine {
    /// Full library sweep: every stage over every section.
    pub(crate) async fn run_full_sweep(&self, run: &mut Run) {
        let sections = self.sections(run).await;

        run.progress("load_indexes", None);
        if self.settings.unmonitor_in_arr {
            self.load_radarr_index(run).await;
            self.load_sonarr_index(run).await;
            // The stage ran even when a backend is degraded to not-connected.
            run.summary.radarr.executed = true;
            run.summary.sonarr.executed = true;
        }

        if self.settings.delete_duplicates {
            run.summary.duplicates.executed = true;
            run.progress("movie_duplicates", None);
            self.movie_duplicate_pass(run, &sections).await;
            run.progress("episode_duplicates", None);
            self.episode_duplicate_pass(run, &sections).await;
            run.progress("cross_library_episodes", None);
            self.cross_library_episode_pass(run).await;
        }

        run.progress("watchlist", None);
        self.watchlist_reconcile(run).await;

        run.progress("season_sync", None);
        self.season_sync_pass(run).await;
    }

    // ---- movies ------------------------------------------------------------

    /// Movie duplicate pass over the given sections: TMDB-id grouping first,
    /// then the server's own duplicate flag for anything grouping missed.
    pub(crate) async fn movie_duplicate_pass(&self, run: &mut Run, sections: &[Section]) {
        for section in sections.iter().filter(|s| s.is_movie()) {
            let listings = match self.plex.list_movies(&section.key, false).await {
                Ok(listings) => listings,
                Err(e) => {
                    run.warn(
                        Subsystem::Plex,
                        format!("movie listing for {:?} failed: {}", section.title, e),
                    );
                    run.summary.duplicates.movies.failures += 1;
                    continue;
                }
            };
            tracing::info!(
                "plex: section {:?} has {} movies",
                section.title,
                listings.len()
            );

            for listing in &listings {
                run.movie_title_index
                    .entry(normalize_title(&listing.title))
                    .or_default()
                    .insert(listing.year);
            }
            run.movie_index_built = true;

            let mut by_tmdb: HashMap<u64, Vec<String>> = HashMap::new();
            for listing in &listings {
                if let Some(tmdb) = listing.tmdb_id {
                    by_tmdb.entry(tmdb).or_default().push(listing.rating_key.clone());
                }
            }

            let mut groups: Vec<(u64, Vec<String>)> = by_tmdb
                .into_iter()
                .filter(|(_, keys)| keys.len() >= 2)
                .collect();
            groups.sort_by_key(|(tmdb, _)| *tmdb);

            let mut grouped_keys: HashSet<String> = HashSet::new();
            for (tmdb, keys) in groups {
                grouped_keys.extend(keys.iter().cloned());
                self.process_movie_group(run, &keys, tmdb).await;
            }

            // Duplicate-flagged items without a usable TMDB group still get
            // intra-item variant cleanup.
            match self.plex.list_duplicate_movie_rating_keys(&section.key).await {
                Ok(keys) => {
                    for key in keys.into_iter().filter(|k| !grouped_keys.contains(k)) {
                        self.movie_variant_cleanup(run, &key).await;
                    }
                }
                Err(e) => run.warn(
                    Subsystem::Plex,
                    format!("duplicate scan for {:?} failed: {}", section.title, e),
                ),
            }
        }
    }

    /// Resolve one TMDB duplicate group: keep one entry, delete the rest,
    /// unmonitor the movie, then verify the survivor.
    pub(crate) async fn process_movie_group(
        &self,
        run: &mut Run,
        rating_keys: &[String],
        tmdb_id: u64,
    ) {
        run.summary.duplicates.movies.groups_found += 1;

        let mut identities: Vec<MediaIdentity> = Vec::new();
        for key in rating_keys {
            match self.plex.get_metadata_details(key).await {
                Ok(details) => identities.push(details.to_identity()),
                Err(e) => {
                    run.warn(Subsystem::Plex, format!("metadata {} failed: {}", key, e));
                    run.summary.duplicates.movies.failures += 1;
                }
            }
        }

        if identities.len() < 2 {
            // Lookup failures collapsed the group; the survivor may still
            // carry redundant variants.
            if let Some(only) = identities.first() {
                let rating_key = only.rating_key.clone();
                self.movie_variant_cleanup(run, &rating_key).await;
            }
            return;
        }

        let Some(resolution) = resolve_group(
            &identities,
            self.settings.delete_preference,
            &self.settings.preserve_quality_terms,
        ) else {
            return;
        };

        self.radarr_unmonitor(run, Some(tmdb_id), Some(&resolution.keep.title))
            .await;

        let mut deleted = 0u32;
        for key in &resolution.delete_keys {
            if run.ctx.dry_run {
                run.summary.duplicates.movies.would_delete_metadata += 1;
                continue;
            }
            match self.plex.delete_metadata(key).await {
                Ok(()) => {
                    tracing::info!("plex: deleted duplicate movie entry {}", key);
                    run.summary.duplicates.movies.metadata_deleted += 1;
                    deleted += 1;
                }
                Err(e) => {
                    run.warn(Subsystem::Plex, format!("delete {} failed: {}", key, e));
                    run.summary.duplicates.movies.failures += 1;
                }
            }
        }

        self.movie_variant_cleanup(run, &resolution.keep.rating_key).await;

        if !run.ctx.dry_run {
            self.verify_single_version(run, &resolution.keep.rating_key, false)
                .await;
        }

        run.summary.duplicates.items.push(format!(
            "movie {:?} tmdb={} kept={} deleted={}",
            resolution.keep.title, tmdb_id, resolution.keep.rating_key, deleted
        ));
    }

    pub(crate) async fn movie_variant_cleanup(&self, run: &mut Run, rating_key: &str) {
        let request = VariantCleanupRequest {
            rating_key: rating_key.to_string(),
            dry_run: run.ctx.dry_run,
            delete_preference: self.settings.delete_preference,
            preserve_quality_terms: self.settings.preserve_quality_terms.clone(),
        };
        match self.variants.cleanup_movie_variants(&request).await {
            Ok(outcome) => {
                run.summary.duplicates.movies.variants_deleted += outcome.deleted;
                run.summary.duplicates.movies.would_delete_variants += outcome.would_delete;
            }
            Err(e) => {
                run.warn(
                    Subsystem::Plex,
                    format!("variant cleanup {} failed: {}", rating_key, e),
                );
                run.summary.duplicates.movies.failures += 1;
            }
        }
    }

    async fn episode_variant_cleanup(&self, run: &mut Run, rating_key: &str) {
        match self
            .variants
            .cleanup_episode_variants(rating_key, run.ctx.dry_run)
            .await
        {
            Ok(outcome) => {
                run.summary.duplicates.episodes.variants_deleted += outcome.deleted;
                run.summary.duplicates.episodes.would_delete_variants += outcome.would_delete;
            }
            Err(e) => {
                run.warn(
                    Subsystem::Plex,
                    format!("variant cleanup {} failed: {}", rating_key, e),
                );
                run.summary.duplicates.episodes.failures += 1;
            }
        }
    }

    /// Read back the surviving entry and flag it if multiple versions remain.
    async fn verify_single_version(&self, run: &mut Run, rating_key: &str, episode: bool) {
        match self.plex.get_metadata_details(rating_key).await {
            Ok(details) => {
                let identity = details.to_identity();
                if Self::distinct_version_count(&identity) > 1 {
                    run.warn(
                        Subsystem::Plex,
                        format!(
                            "item {} still has multiple versions after cleanup",
                            rating_key
                        ),
                    );
                    if episode {
                        run.summary.duplicates.episodes.verify_mismatches += 1;
                    } else {
                        run.summary.duplicates.movies.verify_mismatches += 1;
                    }
                }
            }
            Err(e) => {
                run.warn(
                    Subsystem::Plex,
                    format!("post-cleanup check {} failed: {}", rating_key, e),
                );
                if episode {
                    run.summary.duplicates.episodes.failures += 1;
                } else {
                    run.summary.duplicates.movies.failures += 1;
                }
            }
        }
    }

    // ---- episodes ----------------------------------------------------------

    /// Episode duplicate pass over TV sections. Uses the server's duplicate
    /// flag, falling back to a per-show walk when the flag query fails.
    pub(crate) async fn episode_duplicate_pass(&self, run: &mut Run, sections: &[Section]) {
        for section in sections.iter().filter(|s| s.is_show()) {
            let keys = match self
                .plex
                .list_duplicate_episode_rating_keys(&section.key)
                .await
            {
                Ok(keys) => keys,
                Err(e) => {
                    run.warn(
                        Subsystem::Plex,
                        format!(
                            "duplicate episode scan for {:?} failed, walking shows: {}",
                            section.title, e
                        ),
                    );
                    self.duplicate_episodes_by_walking(run, &section.key).await
                }
            };
            if keys.is_empty() {
                continue;
            }
            tracing::info!(
                "plex: section {:?} has {} duplicate-flagged episodes",
                section.title,
                keys.len()
            );

            let mut by_episode: HashMap<(String, u32, u32), Vec<MediaIdentity>> = HashMap::new();
            let mut singles: Vec<MediaIdentity> = Vec::new();
            for key in &keys {
                let identity = match self.plex.get_metadata_details(key).await {
                    Ok(details) => details.to_identity(),
                    Err(e) => {
                        run.warn(Subsystem::Plex, format!("metadata {} failed: {}", key, e));
                        run.summary.duplicates.episodes.failures += 1;
                        continue;
                    }
                };
                match (&identity.show_title, identity.season, identity.episode) {
                    (Some(show), Some(season), Some(episode)) => {
                        by_episode
                            .entry((normalize_title(show), season, episode))
                            .or_default()
                            .push(identity);
                    }
                    // Incomplete identity: never group, variant cleanup only.
                    _ => singles.push(identity),
                }
            }

            let mut grouped: Vec<((String, u32, u32), Vec<MediaIdentity>)> =
                by_episode.into_iter().collect();
            grouped.sort_by(|(a, _), (b, _)| a.cmp(b));
            for (_, identities) in grouped {
                if identities.len() >= 2 {
                    self.process_episode_group(run, identities, None).await;
                } else {
                    singles.extend(identities);
                }
            }

            for identity in singles {
                self.episode_variant_cleanup(run, &identity.rating_key).await;
            }
        }
    }

    async fn duplicate_episodes_by_walking(&self, run: &mut Run, section_key: &str) -> Vec<String> {
        let shows = match self.plex.list_tv_shows(section_key).await {
            Ok(shows) => shows,
            Err(e) => {
                run.warn(
                    Subsystem::Plex,
                    format!("show listing for section {} failed: {}", section_key, e),
                );
                run.summary.duplicates.episodes.failures += 1;
                return Vec::new();
            }
        };

        let mut keys = Vec::new();
        for show in shows {
            match self.plex.list_episodes_for_show(&show.rating_key, true).await {
                Ok(episodes) => keys.extend(episodes.into_iter().map(|e| e.rating_key)),
                Err(e) => {
                    run.warn(
                        Subsystem::Plex,
                        format!("episode walk for {:?} failed: {}", show.title, e),
                    );
                    run.summary.duplicates.episodes.failures += 1;
                }
            }
        }
        keys
    }

    /// Resolve one episode duplicate group. Episodes carry no delete
    /// preference; resolution and size decide the keeper.
    pub(crate) async fn process_episode_group(
        &self,
        run: &mut Run,
        identities: Vec<MediaIdentity>,
        series_tvdb: Option<u64>,
    ) {
        run.summary.duplicates.episodes.groups_found += 1;

        let Some(resolution) = resolve_group(&identities, DeletePreference::None, &[]) else {
            return;
        };
        let keep = &resolution.keep;

        if self.settings.unmonitor_in_arr {
            self.sonarr_unmonitor_matching_episode(run, keep, series_tvdb)
                .await;
        }

        let mut deleted = 0u32;
        for key in &resolution.delete_keys {
            if run.ctx.dry_run {
                run.summary.duplicates.episodes.would_delete_metadata += 1;
                continue;
            }
            match self.plex.delete_metadata(key).await {
                Ok(()) => {
                    tracing::info!("plex: deleted duplicate episode entry {}", key);
                    run.summary.duplicates.episodes.metadata_deleted += 1;
                    deleted += 1;
                }
                Err(e) => {
                    run.warn(Subsystem::Plex, format!("delete {} failed: {}", key, e));
                    run.summary.duplicates.episodes.failures += 1;
                }
            }
        }

        let keep_key = keep.rating_key.clone();
        let label = match (keep.show_title.as_deref(), keep.season, keep.episode) {
            (Some(show), Some(season), Some(episode)) => {
                format!("{} {}", show, EpisodeKey::new(season, episode))
            }
            _ => keep.title.clone(),
        };

        self.episode_variant_cleanup(run, &keep_key).await;
        if !run.ctx.dry_run {
            self.verify_single_version(run, &keep_key, true).await;
        }

        run.summary.duplicates.items.push(format!(
            "episode {:?} kept={} deleted={}",
            label, keep_key, deleted
        ));
    }

    /// Find the Sonarr episode matching a kept Plex episode and unmonitor it.
    async fn sonarr_unmonitor_matching_episode(
        &self,
        run: &mut Run,
        keep: &MediaIdentity,
        series_tvdb: Option<u64>,
    ) {
        self.load_sonarr_index(run).await;
        if run.sonarr_index.is_none() {
            return;
        }
        run.summary.sonarr.executed = true;

        let (Some(season), Some(episode)) = (keep.season, keep.episode) else {
            return;
        };
        let Some(series) =
            self.resolve_sonarr_series(run, series_tvdb, keep.show_title.as_deref())
        else {
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
            run.summary.sonarr.not_found += 1;
            return;
        };
        self.sonarr_set_episode(run, target, false).await;
    }

    /// Cross-library pass: the same TVDB show present in several sections can
    /// own the same episode under different rating keys. Those never carry
    /// the server's duplicate flag, so they are grouped here explicitly.
    pub(crate) async fn cross_library_episode_pass(&self, run: &mut Run) {
        self.ensure_tvdb_maps(run).await;

        let mut multi: Vec<(u64, Vec<String>)> = run
            .caches
            .tvdb_rating_keys
            .iter()
            .filter(|(_, keys)| keys.len() >= 2)
            .map(|(tvdb, keys)| (*tvdb, keys.clone()))
            .collect();
        multi.sort_by_key(|(tvdb, _)| *tvdb);

        for (tvdb, show_keys) in multi {
            tracing::info!(
                "plex: tvdb {} present as {} library entries",
                tvdb,
                show_keys.len()
            );
            let mut by_episode: HashMap<EpisodeKey, Vec<String>> = HashMap::new();
            for show_key in &show_keys {
                match self.plex.list_episodes_for_show(show_key, false).await {
                    Ok(episodes) => {
                        for ep in episodes {
                            if let (Some(season), Some(episode)) = (ep.season, ep.episode) {
                                by_episode
                                    .entry(EpisodeKey::new(season, episode))
                                    .or_default()
                                    .push(ep.rating_key);
                            }
                        }
                    }
                    Err(e) => {
                        run.warn(
                            Subsystem::Plex,
                            format!("episode listing for show {} failed: {}", show_key, e),
                        );
                        run.summary.duplicates.episodes.failures += 1;
                    }
                }
            }

            let mut grouped: Vec<(EpisodeKey, Vec<String>)> = by_episode
                .into_iter()
                .filter(|(_, keys)| keys.len() >= 2)
                .collect();
            grouped.sort_by_key(|(key, _)| *key);

            for (_, keys) in grouped {
                let mut identities = Vec::new();
                for key in &keys {
                    match self.plex.get_metadata_details(key).await {
                        Ok(details) => identities.push(details.to_identity()),
                        Err(e) => {
                            run.warn(Subsystem::Plex, format!("metadata {} failed: {}", key, e));
                            run.summary.duplicates.episodes.failures += 1;
                        }
                    }
                }
                if identities.len() >= 2 {
                    self.process_episode_group(run, identities, Some(tvdb)).await;
                }
            }
        }
    }

    // ---- watchlist ---------------------------------------------------------

    async fn build_movie_title_index(&self, run: &mut Run) {
        let sections = self.sections(run).await;
        for section in sections.iter().filter(|s| s.is_movie()) {
            match self.plex.list_movies(&section.key, false).await {
                Ok(listings) => {
                    for listing in listings {
                        run.movie_title_index
                            .entry(normalize_title(&listing.title))
                            .or_default()
                            .insert(listing.year);
                    }
                }
                Err(e) => {
                    run.warn(
                        Subsystem::Plex,
                        format!("movie listing for {:?} failed: {}", section.title, e),
                    );
                    run.summary.watchlist.failures += 1;
                }
            }
        }
        run.movie_index_built = true;
    }

    /// Remove watchlist entries already served by the library. Movies match
    /// by normalized title with a year gate; shows additionally require the
    /// library to hold every non-special episode Sonarr knows about.
    pub(crate) async fn watchlist_reconcile(&self, run: &mut Run) {
        if !self.settings.remove_from_watchlist {
            return;
        }
        run.summary.watchlist.executed = true;

        if !run.movie_index_built {
            self.build_movie_title_index(run).await;
        }

        match self.watchlist.list_watchlist(WatchlistKind::Movie).await {
            Ok(entries) => {
                tracing::info!("watchlist: {} movie entries", entries.len());
                for entry in entries {
                    run.summary.watchlist.movies_checked += 1;
                    let in_library = run
                        .movie_title_index
                        .get(&normalize_title(&entry.title))
                        .map(|years| entry.year.is_none() || years.contains(&entry.year))
                        .unwrap_or(false);

                    if !in_library {
                        run.summary.watchlist.not_found += 1;
                        continue;
                    }

                    self.remove_watchlist_entry(run, &entry.rating_key, &entry.title)
                        .await;
                    self.radarr_unmonitor(run, None, Some(&entry.title)).await;
                }
            }
            Err(e) => {
                run.warn(Subsystem::Plex, format!("watchlist listing failed: {}", e));
                run.summary.watchlist.failures += 1;
            }
        }

        self.load_sonarr_index(run).await;
        self.ensure_tvdb_maps(run).await;

        match self.watchlist.list_watchlist(WatchlistKind::Show).await {
            Ok(entries) => {
                tracing::info!("watchlist: {} show entries", entries.len());
                for entry in entries {
                    run.summary.watchlist.shows_checked += 1;
                    let Some(series) = self.resolve_sonarr_series(run, None, Some(&entry.title))
                    else {
                        run.summary.watchlist.not_found += 1;
                        continue;
                    };
                    let Some(episodes) = self.sonarr_episodes(run, series.id).await else {
                        run.summary.watchlist.failures += 1;
                        continue;
                    };

                    let wanted: HashSet<EpisodeKey> = episodes
                        .iter()
                        .map(|e| EpisodeKey::new(e.season_number, e.episode_number))
                        .filter(|k| !k.is_special())
                        .collect();
                    if wanted.is_empty() {
                        run.summary.watchlist.incomplete_shows += 1;
                        continue;
                    }

                    let show_keys = series
                        .tvdb_id
                        .and_then(|tvdb| run.caches.tvdb_rating_keys.get(&tvdb).cloned())
                        .unwrap_or_default();
                    let (owned, failures) = self.plex_episode_union(run, &show_keys).await;
                    run.summary.watchlist.failures += failures;

                    let missing = wanted.difference(&owned).count() as u32;
                    if missing > 0 {
                        tracing::info!(
                            "watchlist: keeping {:?}, {} episodes missing",
                            entry.title,
                            missing
                        );
                        run.summary.sonarr.missing_episodes += missing;
                        run.summary.watchlist.incomplete_shows += 1;
                        continue;
                    }

                    self.remove_watchlist_entry(run, &entry.rating_key, &entry.title)
                        .await;
                    self.sonarr_unmonitor_series(run, &series).await;
                }
            }
            Err(e) => {
                run.warn(Subsystem::Plex, format!("watchlist listing failed: {}", e));
                run.summary.watchlist.failures += 1;
            }
        }
    }

    async fn remove_watchlist_entry(&self, run: &mut Run, rating_key: &str, title: &str) {
        if run.ctx.dry_run {
            tracing::info!("watchlist: would remove {:?}", title);
            run.summary.watchlist.would_remove += 1;
            return;
        }
        match self.watchlist.remove_by_rating_key(rating_key).await {
            Ok(true) => {
                tracing::info!("watchlist: removed {:?}", title);
                run.summary.watchlist.removed += 1;
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

    /// Drop the series-level monitor flag once a show is fully in the library.
    pub(crate) async fn sonarr_unmonitor_series(&self, run: &mut Run, series: &SonarrSeries) {
        if !self.settings.unmonitor_in_arr || !series.monitored {
            return;
        }
        run.summary.sonarr.executed = true;

        if run.ctx.dry_run {
            run.summary.sonarr.would_unmonitor_series += 1;
            return;
        }
        let Some(sonarr) = self.sonarr.as_ref() else {
            return;
        };

        let mut latest = match sonarr.get_series(series.id).await {
            Ok(series) => series,
            Err(e) => {
                run.warn(
                    Subsystem::Sonarr,
                    format!("series refetch {} failed: {}", series.id, e),
                );
                run.summary.sonarr.failures += 1;
                return;
            }
        };
        if !latest.monitored {
            run.summary.sonarr.already_unmonitored += 1;
            return;
        }
        latest.monitored = false;

        match sonarr.update_series(&latest).await {
            Ok(()) => {
                tracing::info!("sonarr: unmonitored series {:?}", latest.title);
                run.summary.sonarr.series_unmonitored += 1;
            }
            Err(e) => {
                run.warn(
                    Subsystem::Sonarr,
                    format!("series unmonitor {:?} failed: {}", latest.title, e),
                );
                run.summary.sonarr.failures += 1;
            }
        }
    }

    // ---- season sync -------------------------------------------------------

    /// Manual-trigger-only pass: unmonitor every Sonarr season whose episodes
    /// are all present in the library. Scheduled runs skip this to keep the
    /// steady-state sweep cheap.
    pub(crate) async fn season_sync_pass(&self, run: &mut Run) {
        if run.ctx.trigger != Trigger::Manual || !self.settings.unmonitor_in_arr {
            return;
        }
        self.load_sonarr_index(run).await;
        let Some(series_list) = run.sonarr_index.clone() else {
            return;
        };
        self.ensure_tvdb_maps(run).await;
        run.summary.sonarr.executed = true;

        for series in series_list.iter().filter(|s| s.monitored) {
            let Some(tvdb) = series.tvdb_id else {
                continue;
            };
            let Some(show_keys) = run.caches.tvdb_rating_keys.get(&tvdb).cloned() else {
                continue;
            };
            let Some(episodes) = self.sonarr_episodes(run, series.id).await else {
                continue;
            };
            let (owned, failures) = self.plex_episode_union(run, &show_keys).await;
            run.summary.sonarr.failures += failures;

            let mut by_season: HashMap<u32, Vec<EpisodeKey>> = HashMap::new();
            for episode in &episodes {
                let key = EpisodeKey::new(episode.season_number, episode.episode_number);
                if !key.is_special() {
                    by_season.entry(key.season).or_default().push(key);
                }
            }

            let mut seasons: Vec<(u32, Vec<EpisodeKey>)> = by_season.into_iter().collect();
            seasons.sort_by_key(|(season, _)| *season);

            for (season, keys) in seasons {
                let complete = keys.iter().all(|k| owned.contains(k));
                if !complete {
                    run.summary.sonarr.seasons_incomplete += 1;
                    continue;
                }
                run.summary.sonarr.seasons_complete += 1;
                let still_monitored = series
                    .seasons
                    .iter()
                    .any(|s| s.season_number == season && s.monitored);
                if still_monitored {
                    tracing::info!(
                        "sonarr: season {} of {:?} complete in library",
                        season,
                        series.title
                    );
                    self.sonarr_unmonitor_season(run, series.id, season).await;
                }
            }
        }
    }
}
