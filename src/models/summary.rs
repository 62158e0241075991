//! Typed run accumulator.
//!
//! Each reconciliation stage returns/updates an explicit stats struct; the
//! whole summary is frozen at run end and handed to the report projector.
//! The dry-run contract lives here: mutating actions bump `would_*` counters
//! in dry-run mode and the plain counters otherwise.

use crate::models::media::Trigger;
use serde::{Deserialize, Serialize};

/// Feature flags as they applied to one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub delete_duplicates: bool,
    pub unmonitor_in_arr: bool,
    pub remove_from_watchlist: bool,
}

/// Deletion counters for one class of duplicates (movies or episodes).
///
/// Metadata deletions remove a whole catalog entry; variant deletions remove
/// redundant files attached to the surviving entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuplicateCounters {
    pub groups_found: u32,
    pub metadata_deleted: u32,
    pub would_delete_metadata: u32,
    pub variants_deleted: u32,
    pub would_delete_variants: u32,
    /// Post-delete verification still reported multiple versions.
    pub verify_mismatches: u32,
    pub failures: u32,
}

/// Duplicate-cleanup stage stats.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuplicateStats {
    /// False when the feature flag is off or the stage never ran.
    pub executed: bool,
    pub skipped_disabled: bool,
    pub movies: DuplicateCounters,
    pub episodes: DuplicateCounters,
    /// Human-readable descriptions of processed items (full sweep only).
    pub items: Vec<String>,
}

/// Radarr monitor-flag stage stats. Movies are never re-monitored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RadarrStats {
    pub executed: bool,
    pub skipped_disabled: bool,
    /// The initial movie-index load succeeded.
    pub connected: bool,
    pub unmonitored: u32,
    pub would_unmonitor: u32,
    pub already_unmonitored: u32,
    pub not_found: u32,
    pub failures: u32,
}

/// Sonarr monitor-flag stage stats. Show/season/episode flows sync
/// bidirectionally, so there are monitor counters too.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SonarrStats {
    pub executed: bool,
    pub skipped_disabled: bool,
    pub connected: bool,
    pub unmonitored: u32,
    pub would_unmonitor: u32,
    pub monitored: u32,
    pub would_monitor: u32,
    pub already_unmonitored: u32,
    /// Whole-series monitor flips, counted apart from episode flips.
    pub series_unmonitored: u32,
    pub would_unmonitor_series: u32,
    pub seasons_unmonitored: u32,
    pub would_unmonitor_seasons: u32,
    /// Season-completeness tally from the season sync passes.
    pub seasons_complete: u32,
    pub seasons_incomplete: u32,
    pub not_found: u32,
    pub missing_episodes: u32,
    pub failures: u32,
}

/// Watchlist reconciliation stage stats.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchlistStats {
    pub executed: bool,
    pub skipped_disabled: bool,
    pub movies_checked: u32,
    pub shows_checked: u32,
    pub removed: u32,
    pub would_remove: u32,
    pub not_found: u32,
    /// Shows kept on the watchlist because the completeness gate failed.
    pub incomplete_shows: u32,
    pub failures: u32,
}

/// Coarse progress marker persisted live by the job harness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    pub stage: String,
    pub detail: Option<String>,
}

/// Raw accumulator for one cleanup run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupSummary {
    pub dry_run: bool,
    pub trigger: Trigger,
    /// `full_sweep` / `movie` / `show` / `season` / `episode` / `unsupported`.
    pub mode: String,
    pub features: FeatureFlags,
    pub skipped: bool,
    pub skip_reason: Option<String>,
    pub duplicates: DuplicateStats,
    pub radarr: RadarrStats,
    pub sonarr: SonarrStats,
    pub watchlist: WatchlistStats,
    /// Subsystem-prefixed warning strings accumulated across stages.
    pub warnings: Vec<String>,
    pub progress: Option<Progress>,
}

impl CleanupSummary {
    pub fn new(dry_run: bool, trigger: Trigger, mode: &str, features: FeatureFlags) -> Self {
        Self {
            dry_run,
            trigger,
            mode: mode.to_string(),
            features,
            skipped: false,
            skip_reason: None,
            duplicates: DuplicateStats::default(),
            radarr: RadarrStats::default(),
            sonarr: SonarrStats::default(),
            watchlist: WatchlistStats::default(),
            warnings: Vec::new(),
            progress: None,
        }
    }

    /// Mark the whole run skipped with a machine-readable reason.
    pub fn mark_skipped(&mut self, reason: &str) {
        self.skipped = true;
        self.skip_reason = Some(reason.to_string());
    }

    /// Total failure count across all stages.
    pub fn total_failures(&self) -> u32 {
        self.duplicates.movies.failures
            + self.duplicates.episodes.failures
            + self.radarr.failures
            + self.sonarr.failures
            + self.watchlist.failures
    }
}
