//! Schedule command implementation: recurring cleanup sweeps.

use crate::cli::commands::build_engine;
use crate::jobs::{JobsService, ScheduleEntry, Scheduler};
use crate::models::config::load_config;
use crate::Result;
use colored::Colorize;
use std::sync::Arc;
use std::time::Duration;

pub async fn run_schedule(interval_mins: u64, dry_run: bool) -> Result<()> {
    let config = load_config();
    let engine = Arc::new(build_engine(&config)?);
    let jobs = Arc::new(JobsService::new(config.runs_dir.clone()));

    let recovered = jobs.recover_orphans()?;
    if recovered > 0 {
        println!(
            "{} {} orphaned run(s) marked failed",
            "Note:".yellow(),
            recovered
        );
    }

    println!(
        "{} every {} minutes{} (Ctrl-C to stop)",
        "Scheduling cleanup sweep".bold().cyan(),
        interval_mins,
        if dry_run { ", dry run" } else { "" }
    );

    let entry = ScheduleEntry::cleanup_sweep(Duration::from_secs(interval_mins * 60), dry_run);
    Scheduler::new(jobs, engine).run(vec![entry]).await
}
