//! Curatarr CLI
//!
//! Keeps a Plex library tidy: deletes duplicate copies, syncs Radarr/Sonarr
//! monitor flags and prunes the watchlist once content has landed.

use clap::Parser;
use curatarr::cli::{
    args::{Cli, Commands, JobsAction},
    commands::{cleanup, jobs, schedule, search},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Cleanup {
            payload,
            media_type,
            title,
            year,
            rating_key,
            show_title,
            show_rating_key,
            season,
            episode,
            tmdb_id,
            tvdb_id,
            dry_run,
        } => {
            cleanup::run_cleanup(cleanup::CleanupArgs {
                payload,
                media_type,
                title,
                year,
                rating_key,
                show_title,
                show_rating_key,
                season,
                episode,
                tmdb_id,
                tvdb_id,
                dry_run,
            })
            .await?;
        }

        Commands::Jobs { action } => match action {
            JobsAction::List => {
                jobs::list_runs().await?;
            }
            JobsAction::Show { run_id } => {
                jobs::show_run(&run_id).await?;
            }
        },

        Commands::Schedule {
            interval_mins,
            dry_run,
        } => {
            schedule::run_schedule(interval_mins, dry_run).await?;
        }

        Commands::Search { movies, episodes } => {
            search::run_search(movies, episodes).await?;
        }
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("curatarr=debug")
    } else {
        EnvFilter::new("curatarr=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
