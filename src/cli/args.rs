//! Command line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Curatarr - reconcile your media library against Radarr, Sonarr and the watchlist
#[derive(Parser, Debug)]
#[command(name = "curatarr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a cleanup reconciliation (full sweep unless a media type is given)
    Cleanup {
        /// Path to a JSON webhook payload ("-" for stdin)
        #[arg(long, value_name = "FILE")]
        payload: Option<PathBuf>,

        /// Media type: movie, show, season or episode
        #[arg(long)]
        media_type: Option<String>,

        /// Item title
        #[arg(long)]
        title: Option<String>,

        /// Release year (movies)
        #[arg(long)]
        year: Option<i32>,

        /// Library rating key of the item
        #[arg(long)]
        rating_key: Option<String>,

        /// Show title (season/episode payloads)
        #[arg(long)]
        show_title: Option<String>,

        /// Show rating key (season/episode payloads)
        #[arg(long)]
        show_rating_key: Option<String>,

        /// Season number
        #[arg(long)]
        season: Option<u32>,

        /// Episode number
        #[arg(long)]
        episode: Option<u32>,

        /// TMDB id (movies)
        #[arg(long)]
        tmdb_id: Option<u64>,

        /// TVDB id (shows)
        #[arg(long)]
        tvdb_id: Option<u64>,

        /// Dry run - count what would change without mutating anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Inspect job runs
    Jobs {
        #[command(subcommand)]
        action: JobsAction,
    },

    /// Run recurring cleanup sweeps until stopped
    Schedule {
        /// Minutes between sweeps
        #[arg(long, default_value_t = 360)]
        interval_mins: u64,

        /// Dry run every sweep
        #[arg(long)]
        dry_run: bool,
    },

    /// Trigger missing-content searches in Radarr/Sonarr
    Search {
        /// Search for missing monitored movies
        #[arg(long)]
        movies: bool,

        /// Search for missing monitored episodes
        #[arg(long)]
        episodes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum JobsAction {
    /// List recorded runs, newest first
    List,

    /// Show one run in detail
    Show {
        /// Run ID
        #[arg(value_name = "RUN_ID")]
        run_id: String,
    },
}
