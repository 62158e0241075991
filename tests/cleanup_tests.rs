//! Integration tests for the reconciliation engine.
//!
//! Tests cover:
//! - Full-sweep duplicate resolution with monitor and watchlist side effects
//! - The dry-run contract (reads happen, nothing mutates)
//! - Bidirectional episode-monitor sync and the show completeness gate
//! - Feature flags and unsupported payloads

mod common;

use common::*;
use curatarr::core::cleanup::JobContext;
use curatarr::models::config::CleanupConfig;
use curatarr::models::media::{CleanupInput, ReconciliationRequest, Trigger, WatchlistKind};
use curatarr::services::{EpisodeListing, MovieListing};
use std::collections::HashMap;
use std::sync::Arc;

fn movie_listing(rating_key: &str, title: &str, year: i32, tmdb: u64) -> MovieListing {
    MovieListing {
        rating_key: rating_key.to_string(),
        title: title.to_string(),
        tmdb_id: Some(tmdb),
        year: Some(year),
        added_at: Some(0),
    }
}

fn episode_listing(rating_key: &str, season: u32, episode: u32) -> EpisodeListing {
    EpisodeListing {
        rating_key: rating_key.to_string(),
        title: format!("S{:02}E{:02}", season, episode),
        season: Some(season),
        episode: Some(episode),
    }
}

/// Two copies of the same movie, Radarr monitoring it, the movie on the
/// watchlist. One sweep fixes all three systems.
fn duplicate_movie_fixture() -> (Arc<MockPlex>, Arc<MockVariants>, Arc<MockWatchlist>, Arc<MockRadarr>, Arc<MockSonarr>) {
    let mut plex = MockPlex::default();
    plex.sections = vec![MockPlex::movie_section()];
    plex.movies.lock().unwrap().insert(
        "1".to_string(),
        vec![
            movie_listing("m1", "The Matrix", 1999, 603),
            movie_listing("m2", "The Matrix", 1999, 603),
        ],
    );
    plex.duplicate_movies
        .lock()
        .unwrap()
        .insert("1".to_string(), vec!["m1".to_string(), "m2".to_string()]);
    let plex = Arc::new(plex);
    plex.insert_details(movie_details(
        "m1",
        "The Matrix",
        1999,
        603,
        100,
        vec![variant(11, "1080", 4)],
    ));
    plex.insert_details(movie_details(
        "m2",
        "The Matrix",
        1999,
        603,
        200,
        vec![variant(22, "4k", 8)],
    ));

    let radarr = Arc::new(MockRadarr::default());
    radarr
        .movies
        .lock()
        .unwrap()
        .push(radarr_movie(1, "The Matrix", 603, true));

    let watchlist = Arc::new(MockWatchlist::default());
    watchlist.entries.lock().unwrap().push(watchlist_entry(
        "w1",
        "The Matrix",
        Some(1999),
        WatchlistKind::Movie,
    ));

    (
        plex,
        Arc::new(MockVariants::default()),
        watchlist,
        radarr,
        Arc::new(MockSonarr::default()),
    )
}

#[tokio::test]
async fn test_full_sweep_resolves_duplicate_movie_group() {
    let (plex, variants, watchlist, radarr, sonarr) = duplicate_movie_fixture();
    let engine = build_engine(
        Arc::clone(&plex),
        variants,
        Arc::clone(&watchlist),
        Some(Arc::clone(&radarr)),
        Some(sonarr),
        CleanupConfig::default(),
    );

    let ctx = JobContext::new(false, Trigger::Manual);
    let summary = engine
        .run(&ctx, ReconciliationRequest::FullSweep)
        .await
        .unwrap();

    // The 4K copy wins; the 1080p entry is deleted.
    assert_eq!(*plex.deleted.lock().unwrap(), vec!["m1".to_string()]);
    assert_eq!(summary.duplicates.movies.groups_found, 1);
    assert_eq!(summary.duplicates.movies.metadata_deleted, 1);
    assert_eq!(summary.duplicates.movies.verify_mismatches, 0);

    // Radarr stops monitoring the movie.
    assert!(!radarr.movies.lock().unwrap()[0].monitored);
    assert_eq!(summary.radarr.unmonitored, 1);

    // The watchlist entry for the now-present movie is gone.
    assert!(watchlist.entries.lock().unwrap().is_empty());
    assert_eq!(summary.watchlist.removed, 1);
    assert_eq!(summary.total_failures(), 0);
}

#[tokio::test]
async fn test_dry_run_counts_without_mutating() {
    let (plex, variants, watchlist, radarr, sonarr) = duplicate_movie_fixture();
    let engine = build_engine(
        Arc::clone(&plex),
        variants,
        Arc::clone(&watchlist),
        Some(Arc::clone(&radarr)),
        Some(sonarr),
        CleanupConfig::default(),
    );

    let ctx = JobContext::new(true, Trigger::Manual);
    let summary = engine
        .run(&ctx, ReconciliationRequest::FullSweep)
        .await
        .unwrap();

    // Nothing mutated anywhere.
    assert!(plex.deleted.lock().unwrap().is_empty());
    assert!(radarr.movies.lock().unwrap()[0].monitored);
    assert_eq!(watchlist.entries.lock().unwrap().len(), 1);

    // But every mutation was counted.
    assert_eq!(summary.duplicates.movies.would_delete_metadata, 1);
    assert_eq!(summary.duplicates.movies.metadata_deleted, 0);
    assert_eq!(summary.radarr.would_unmonitor, 1);
    assert_eq!(summary.watchlist.would_remove, 1);
    assert!(summary.dry_run);
}

#[tokio::test]
async fn test_dry_run_counters_mirror_live_counters() {
    // A dry run must predict exactly what the live run does; in particular
    // the watchlist pass re-visits the movie Radarr already unmonitored, and
    // both runs must classify that second visit the same way.
    let (plex, variants, watchlist, radarr, sonarr) = duplicate_movie_fixture();
    let engine = build_engine(plex, variants, watchlist, Some(radarr), Some(sonarr), CleanupConfig::default());
    let live = engine
        .run(&JobContext::new(false, Trigger::Manual), ReconciliationRequest::FullSweep)
        .await
        .unwrap();

    let (plex, variants, watchlist, radarr, sonarr) = duplicate_movie_fixture();
    let engine = build_engine(plex, variants, watchlist, Some(radarr), Some(sonarr), CleanupConfig::default());
    let dry = engine
        .run(&JobContext::new(true, Trigger::Manual), ReconciliationRequest::FullSweep)
        .await
        .unwrap();

    assert_eq!(dry.radarr.would_unmonitor, live.radarr.unmonitored);
    assert_eq!(dry.radarr.already_unmonitored, live.radarr.already_unmonitored);
    assert_eq!(
        dry.duplicates.movies.would_delete_metadata,
        live.duplicates.movies.metadata_deleted
    );
    assert_eq!(dry.watchlist.would_remove, live.watchlist.removed);
}

#[tokio::test]
async fn test_second_sweep_is_a_noop() {
    let (plex, variants, watchlist, radarr, sonarr) = duplicate_movie_fixture();
    let engine = build_engine(
        Arc::clone(&plex),
        variants,
        watchlist,
        Some(radarr),
        Some(sonarr),
        CleanupConfig::default(),
    );

    let ctx = JobContext::new(false, Trigger::Manual);
    engine
        .run(&ctx, ReconciliationRequest::FullSweep)
        .await
        .unwrap();

    // Everything converged in the first sweep; the second finds nothing.
    let second = engine
        .run(&ctx, ReconciliationRequest::FullSweep)
        .await
        .unwrap();
    assert_eq!(second.duplicates.movies.groups_found, 0);
    assert_eq!(second.duplicates.movies.metadata_deleted, 0);
    assert_eq!(second.radarr.unmonitored, 0);
    assert_eq!(second.watchlist.removed, 0);
    assert_eq!(second.total_failures(), 0);
    assert_eq!(plex.deleted.lock().unwrap().len(), 1);
}

fn show_fixture(present: &[(u32, u32)]) -> (Arc<MockPlex>, Arc<MockSonarr>, Arc<MockWatchlist>) {
    let mut plex = MockPlex::default();
    plex.sections = vec![MockPlex::show_section()];
    plex.episodes.insert(
        "s1".to_string(),
        present
            .iter()
            .enumerate()
            .map(|(i, (s, e))| episode_listing(&format!("e{}", i), *s, *e))
            .collect(),
    );
    plex.tvdb_maps.insert(
        "2".to_string(),
        HashMap::from([(81189u64, "s1".to_string())]),
    );

    let sonarr = Arc::new(MockSonarr::default());
    sonarr
        .series
        .lock()
        .unwrap()
        .push(sonarr_series(5, "Breaking Bad", 81189, true));
    {
        let mut episodes = sonarr.episodes.lock().unwrap();
        episodes.push(sonarr_episode(51, 5, 1, 1, true));
        episodes.push(sonarr_episode(52, 5, 1, 2, false));
        episodes.push(sonarr_episode(53, 5, 1, 3, true));
    }

    let watchlist = Arc::new(MockWatchlist::default());
    watchlist.entries.lock().unwrap().push(watchlist_entry(
        "w2",
        "Breaking Bad",
        None,
        WatchlistKind::Show,
    ));

    (Arc::new(plex), sonarr, watchlist)
}

#[tokio::test]
async fn test_show_flow_syncs_monitor_flags_bidirectionally() {
    // S01E01 and E02 are in the library, E03 is not.
    let (plex, sonarr, watchlist) = show_fixture(&[(1, 1), (1, 2)]);
    let engine = build_engine(
        plex,
        Arc::new(MockVariants::default()),
        Arc::clone(&watchlist),
        None,
        Some(Arc::clone(&sonarr)),
        CleanupConfig::default(),
    );

    let ctx = JobContext::new(false, Trigger::Auto);
    let request = ReconciliationRequest::Show {
        title: Some("Breaking Bad".to_string()),
        rating_key: None,
        tvdb_id: Some(81189),
    };
    let summary = engine.run(&ctx, request).await.unwrap();

    let episodes = sonarr.episodes.lock().unwrap();
    // Present and monitored -> unmonitored.
    assert!(!episodes.iter().find(|e| e.id == 51).unwrap().monitored);
    // Present and already unmonitored -> untouched.
    assert!(!episodes.iter().find(|e| e.id == 52).unwrap().monitored);
    // Absent and monitored -> stays monitored so it still downloads.
    assert!(episodes.iter().find(|e| e.id == 53).unwrap().monitored);
    drop(episodes);

    assert_eq!(summary.sonarr.unmonitored, 1);
    assert_eq!(summary.sonarr.already_unmonitored, 1);
    assert_eq!(summary.sonarr.missing_episodes, 1);

    // Incomplete show: the watchlist entry survives.
    assert_eq!(watchlist.entries.lock().unwrap().len(), 1);
    assert_eq!(summary.watchlist.incomplete_shows, 1);
    assert_eq!(summary.watchlist.removed, 0);
}

#[tokio::test]
async fn test_show_flow_complete_show_leaves_watchlist() {
    let (plex, sonarr, watchlist) = show_fixture(&[(1, 1), (1, 2), (1, 3)]);
    let engine = build_engine(
        plex,
        Arc::new(MockVariants::default()),
        Arc::clone(&watchlist),
        None,
        Some(Arc::clone(&sonarr)),
        CleanupConfig::default(),
    );

    let ctx = JobContext::new(false, Trigger::Auto);
    let request = ReconciliationRequest::Show {
        title: Some("Breaking Bad".to_string()),
        rating_key: None,
        tvdb_id: Some(81189),
    };
    let summary = engine.run(&ctx, request).await.unwrap();

    // Every episode present: watchlist entry removed, series unmonitored.
    assert!(watchlist.entries.lock().unwrap().is_empty());
    assert_eq!(summary.watchlist.removed, 1);
    assert_eq!(summary.watchlist.incomplete_shows, 0);
    assert!(!sonarr.series.lock().unwrap()[0].monitored);
    assert_eq!(summary.sonarr.missing_episodes, 0);
    // Episode flips and the series-level flip are counted apart.
    assert_eq!(summary.sonarr.unmonitored, 2);
    assert_eq!(summary.sonarr.series_unmonitored, 1);
}

#[tokio::test]
async fn test_complete_show_leaves_watchlist_with_monitor_sync_disabled() {
    // Watchlist pruning needs the Sonarr index read-only; turning monitor
    // sync off must not starve the completeness check.
    let (plex, sonarr, watchlist) = show_fixture(&[(1, 1), (1, 2), (1, 3)]);
    let settings = CleanupConfig {
        unmonitor_in_arr: false,
        ..CleanupConfig::default()
    };
    let engine = build_engine(
        plex,
        Arc::new(MockVariants::default()),
        Arc::clone(&watchlist),
        None,
        Some(Arc::clone(&sonarr)),
        settings,
    );

    let ctx = JobContext::new(false, Trigger::Manual);
    let summary = engine
        .run(&ctx, ReconciliationRequest::FullSweep)
        .await
        .unwrap();

    assert!(watchlist.entries.lock().unwrap().is_empty());
    assert_eq!(summary.watchlist.removed, 1);
    assert_eq!(summary.watchlist.not_found, 0);

    // No monitor flag moved anywhere.
    assert!(sonarr.series.lock().unwrap()[0].monitored);
    assert_eq!(summary.sonarr.unmonitored, 0);
    assert_eq!(summary.sonarr.series_unmonitored, 0);
    assert!(summary.sonarr.skipped_disabled);
}

#[tokio::test]
async fn test_manual_sweep_accounts_for_season_completeness() {
    // Season 1 fully in the library, season 2 missing an episode.
    let (plex, sonarr, _) = show_fixture(&[(1, 1), (1, 2), (1, 3), (2, 1)]);
    {
        let mut series = sonarr.series.lock().unwrap();
        series[0].seasons = vec![sonarr_season(1, true), sonarr_season(2, true)];
        let mut episodes = sonarr.episodes.lock().unwrap();
        episodes.push(sonarr_episode(54, 5, 2, 1, true));
        episodes.push(sonarr_episode(55, 5, 2, 2, true));
    }
    let watchlist = Arc::new(MockWatchlist::default());
    let engine = build_engine(
        plex,
        Arc::new(MockVariants::default()),
        watchlist,
        None,
        Some(Arc::clone(&sonarr)),
        CleanupConfig::default(),
    );

    let ctx = JobContext::new(false, Trigger::Manual);
    let summary = engine
        .run(&ctx, ReconciliationRequest::FullSweep)
        .await
        .unwrap();

    assert_eq!(summary.sonarr.seasons_complete, 1);
    assert_eq!(summary.sonarr.seasons_incomplete, 1);
    assert_eq!(summary.sonarr.seasons_unmonitored, 1);
    // Only season 1 was flipped off on the series object.
    let series = sonarr.series.lock().unwrap();
    assert!(!series[0].seasons[0].monitored);
    assert!(series[0].seasons[1].monitored);
}

#[tokio::test]
async fn test_watchlist_movie_requires_matching_library_year() {
    let mut plex = MockPlex::default();
    plex.sections = vec![MockPlex::movie_section()];
    plex.movies.lock().unwrap().insert(
        "1".to_string(),
        vec![
            // Library carries no year for Heat; a dated watchlist entry must
            // not treat that as a match.
            MovieListing {
                rating_key: "h1".to_string(),
                title: "Heat".to_string(),
                tmdb_id: None,
                year: None,
                added_at: Some(0),
            },
            movie_listing("d1", "Dune", 2021, 438631),
        ],
    );

    let watchlist = Arc::new(MockWatchlist::default());
    {
        let mut entries = watchlist.entries.lock().unwrap();
        entries.push(watchlist_entry("w3", "Heat", Some(1995), WatchlistKind::Movie));
        // An undated watchlist entry matches any library year.
        entries.push(watchlist_entry("w4", "Dune", None, WatchlistKind::Movie));
    }

    let engine = build_engine(
        Arc::new(plex),
        Arc::new(MockVariants::default()),
        Arc::clone(&watchlist),
        None,
        None,
        CleanupConfig::default(),
    );

    let ctx = JobContext::new(false, Trigger::Manual);
    let summary = engine
        .run(&ctx, ReconciliationRequest::FullSweep)
        .await
        .unwrap();

    assert_eq!(summary.watchlist.removed, 1);
    assert_eq!(summary.watchlist.not_found, 1);
    let entries = watchlist.entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "Heat");
}

#[tokio::test]
async fn test_episode_flow_unmonitors_only_that_episode() {
    let (plex, sonarr, watchlist) = show_fixture(&[(1, 1), (1, 2)]);
    let engine = build_engine(
        plex,
        Arc::new(MockVariants::default()),
        Arc::clone(&watchlist),
        None,
        Some(Arc::clone(&sonarr)),
        CleanupConfig::default(),
    );

    let ctx = JobContext::new(false, Trigger::Auto);
    let request = ReconciliationRequest::Episode {
        show_title: Some("Breaking Bad".to_string()),
        show_rating_key: None,
        tvdb_id: Some(81189),
        season: 1,
        episode: 1,
    };
    let summary = engine.run(&ctx, request).await.unwrap();

    let episodes = sonarr.episodes.lock().unwrap();
    assert!(!episodes.iter().find(|e| e.id == 51).unwrap().monitored);
    // The other monitored episode is untouched by the episode flow.
    assert!(episodes.iter().find(|e| e.id == 53).unwrap().monitored);
    drop(episodes);

    assert_eq!(summary.sonarr.unmonitored, 1);
    // Episode flows never touch the watchlist.
    assert!(!summary.watchlist.executed);
    assert_eq!(watchlist.entries.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_all_features_disabled_skips_run() {
    let (plex, variants, watchlist, radarr, sonarr) = duplicate_movie_fixture();
    let settings = CleanupConfig {
        delete_duplicates: false,
        unmonitor_in_arr: false,
        remove_from_watchlist: false,
        ..CleanupConfig::default()
    };
    let engine = build_engine(
        Arc::clone(&plex),
        variants,
        watchlist,
        Some(radarr),
        Some(sonarr),
        settings,
    );

    let ctx = JobContext::new(false, Trigger::Manual);
    let summary = engine
        .run(&ctx, ReconciliationRequest::FullSweep)
        .await
        .unwrap();

    assert!(summary.skipped);
    assert_eq!(summary.skip_reason.as_deref(), Some("no_features_enabled"));
    assert!(plex.deleted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unsupported_media_type_is_skipped_not_failed() {
    let (plex, variants, watchlist, radarr, sonarr) = duplicate_movie_fixture();
    let engine = build_engine(
        plex,
        variants,
        watchlist,
        Some(radarr),
        Some(sonarr),
        CleanupConfig::default(),
    );

    let input = CleanupInput {
        media_type: Some("track".to_string()),
        ..CleanupInput::default()
    };
    let request = ReconciliationRequest::from_input(&input);
    assert_eq!(request.mode(), "unsupported");

    let ctx = JobContext::new(false, Trigger::Auto);
    let summary = engine.run(&ctx, request).await.unwrap();
    assert!(summary.skipped);
    assert_eq!(
        summary.skip_reason.as_deref(),
        Some("unsupported_media_type")
    );
    assert_eq!(summary.total_failures(), 0);
}

#[tokio::test]
async fn test_unconfigured_backends_degrade_to_not_connected() {
    let (plex, variants, watchlist, _, _) = duplicate_movie_fixture();
    let engine = build_engine(
        Arc::clone(&plex),
        variants,
        Arc::clone(&watchlist),
        None,
        None,
        CleanupConfig::default(),
    );

    let ctx = JobContext::new(false, Trigger::Manual);
    let summary = engine
        .run(&ctx, ReconciliationRequest::FullSweep)
        .await
        .unwrap();

    // Duplicate and watchlist work still happened.
    assert_eq!(*plex.deleted.lock().unwrap(), vec!["m1".to_string()]);
    assert_eq!(summary.watchlist.removed, 1);
    // Monitor sync degraded instead of failing the run.
    assert!(!summary.radarr.connected);
    assert!(!summary.sonarr.connected);
    assert_eq!(summary.radarr.unmonitored, 0);
}
