//! Jobs command implementation: inspect persisted run records.

use crate::cli::commands::print_report;
use crate::jobs::JobsService;
use crate::models::config::load_config;
use crate::Result;
use colored::Colorize;

pub async fn list_runs() -> Result<()> {
    let config = load_config();
    let jobs = JobsService::new(config.runs_dir.clone());
    let records = jobs.list_runs()?;

    println!("{}", "Job runs".bold().cyan());
    println!();
    if records.is_empty() {
        println!("No runs recorded.");
        return Ok(());
    }

    println!(
        "{:<38} {:<10} {:<10} {:<9} {}",
        "Run ID".bold(),
        "Job".bold(),
        "Status".bold(),
        "Trigger".bold(),
        "Started".bold()
    );
    println!("{}", "-".repeat(90));
    for record in records {
        let status = format!("{:?}", record.status).to_lowercase();
        let status = match status.as_str() {
            "succeeded" => status.green(),
            "failed" => status.red(),
            _ => status.yellow(),
        };
        println!(
            "{:<38} {:<10} {:<10} {:<9} {}",
            record.run_id,
            record.job_id,
            status,
            record.trigger,
            record.started_at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    println!();
    println!("Runs directory: {}", config.runs_dir.display());
    Ok(())
}

pub async fn show_run(run_id: &str) -> Result<()> {
    let config = load_config();
    let jobs = JobsService::new(config.runs_dir.clone());
    let record = jobs.get_run(run_id)?;

    println!("{} {}", "Run:".bold().cyan(), record.run_id);
    println!("  {} {}", "Job:".bold(), record.job_id);
    println!("  {} {:?}", "Status:".bold(), record.status);
    println!("  {} {}", "Trigger:".bold(), record.trigger);
    println!("  {} {}", "Dry run:".bold(), record.dry_run);
    println!("  {} {}", "Started:".bold(), record.started_at);
    if let Some(finished) = record.finished_at {
        println!("  {} {}", "Finished:".bold(), finished);
    }
    if let Some(progress) = &record.progress {
        match &progress.detail {
            Some(detail) => println!("  {} {} ({})", "Stage:".bold(), progress.stage, detail),
            None => println!("  {} {}", "Stage:".bold(), progress.stage),
        }
    }
    if let Some(error) = &record.error {
        println!("  {} {}", "Error:".bold().red(), error);
    }

    if let Some(report) = &record.report {
        print_report(report);
    }
    Ok(())
}
