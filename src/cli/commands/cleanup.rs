//! Cleanup command implementation.

use crate::cli::commands::{build_engine, print_report};
use crate::jobs::{JobsService, CLEANUP_JOB_ID};
use crate::models::config::load_config;
use crate::models::media::{CleanupInput, ReconciliationRequest, Trigger};
use crate::Result;
use colored::Colorize;
use std::io::Read;
use std::path::{Path, PathBuf};

/// CLI-side fields merged over an optional payload file.
#[derive(Debug, Default)]
pub struct CleanupArgs {
    pub payload: Option<PathBuf>,
    pub media_type: Option<String>,
    pub title: Option<String>,
    pub year: Option<i32>,
    pub rating_key: Option<String>,
    pub show_title: Option<String>,
    pub show_rating_key: Option<String>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub tmdb_id: Option<u64>,
    pub tvdb_id: Option<u64>,
    pub dry_run: bool,
}

fn load_payload(path: &Path) -> Result<CleanupInput> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&content)?)
}

fn merge_input(args: &CleanupArgs) -> Result<CleanupInput> {
    let mut input = match &args.payload {
        Some(path) => load_payload(path)?,
        None => CleanupInput::default(),
    };

    // Explicit flags win over the payload.
    if args.media_type.is_some() {
        input.media_type = args.media_type.clone();
    }
    if args.title.is_some() {
        input.title = args.title.clone();
    }
    if args.year.is_some() {
        input.year = args.year;
    }
    if args.rating_key.is_some() {
        input.rating_key = args.rating_key.clone();
    }
    if args.show_title.is_some() {
        input.show_title = args.show_title.clone();
    }
    if args.show_rating_key.is_some() {
        input.show_rating_key = args.show_rating_key.clone();
    }
    if args.season.is_some() {
        input.season_number = args.season;
    }
    if args.episode.is_some() {
        input.episode_number = args.episode;
    }
    if args.tmdb_id.is_some() {
        input.tmdb_id = args.tmdb_id;
    }
    if args.tvdb_id.is_some() {
        input.tvdb_id = args.tvdb_id;
    }
    Ok(input)
}

/// Run one cleanup reconciliation end to end and print the report.
pub async fn run_cleanup(args: CleanupArgs) -> Result<()> {
    let config = load_config();
    let input = merge_input(&args)?;
    let request = ReconciliationRequest::from_input(&input);

    // Payload-driven runs come from webhooks; bare invocations are manual.
    let trigger = if args.payload.is_some() || input.media_type.is_some() {
        Trigger::Auto
    } else {
        Trigger::Manual
    };

    println!(
        "{} mode={} dry_run={}",
        "Starting cleanup".bold().cyan(),
        request.mode(),
        args.dry_run
    );

    let jobs = JobsService::new(config.runs_dir.clone());
    let recovered = jobs.recover_orphans()?;
    if recovered > 0 {
        println!("{} {} orphaned run(s) marked failed", "Note:".yellow(), recovered);
    }

    // A configuration failure still leaves a failed run on record.
    let engine = match build_engine(&config) {
        Ok(engine) => engine,
        Err(e) => {
            let record = jobs.record_failure(CLEANUP_JOB_ID, trigger, args.dry_run, &e)?;
            println!("{} {}", "Cleanup failed:".red().bold(), e);
            println!("Run ID: {}", record.run_id);
            return Err(e);
        }
    };

    let record = jobs
        .execute_cleanup(CLEANUP_JOB_ID, &engine, request, trigger, args.dry_run)
        .await?;

    if let Some(report) = &record.report {
        print_report(report);
    }
    println!("Run ID: {}", record.run_id);
    Ok(())
}
