//! Interval scheduler for recurring cleanup sweeps.

use crate::core::cleanup::CleanupEngine;
use crate::error::{Error, Result};
use crate::jobs::service::{JobsService, CLEANUP_JOB_ID};
use crate::models::media::{ReconciliationRequest, Trigger};
use std::sync::Arc;
use std::time::Duration;

/// One recurring job registration.
#[derive(Debug, Clone)]
pub struct ScheduleEntry {
    pub job_id: String,
    pub interval: Duration,
    pub dry_run: bool,
}

impl ScheduleEntry {
    pub fn cleanup_sweep(interval: Duration, dry_run: bool) -> Self {
        Self {
            job_id: CLEANUP_JOB_ID.to_string(),
            interval,
            dry_run,
        }
    }
}

pub struct Scheduler {
    jobs: Arc<JobsService>,
    engine: Arc<CleanupEngine>,
}

impl Scheduler {
    pub fn new(jobs: Arc<JobsService>, engine: Arc<CleanupEngine>) -> Self {
        Self { jobs, engine }
    }

    /// Drive every registered entry until the process is stopped. The first
    /// firing happens one full interval after startup.
    pub async fn run(&self, entries: Vec<ScheduleEntry>) -> Result<()> {
        if entries.is_empty() {
            return Err(Error::Config("no schedule entries".to_string()));
        }

        let mut handles = Vec::new();
        for entry in entries {
            let jobs = Arc::clone(&self.jobs);
            let engine = Arc::clone(&self.engine);
            handles.push(tokio::spawn(async move {
                let start = tokio::time::Instant::now() + entry.interval;
                let mut ticker = tokio::time::interval_at(start, entry.interval);
                ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    tracing::info!("scheduler: firing job '{}'", entry.job_id);
                    match jobs
                        .execute_cleanup(
                            &entry.job_id,
                            &engine,
                            ReconciliationRequest::FullSweep,
                            Trigger::Schedule,
                            entry.dry_run,
                        )
                        .await
                    {
                        Ok(record) => tracing::info!(
                            "scheduler: job '{}' run {} finished status={:?}",
                            entry.job_id,
                            record.run_id,
                            record.status
                        ),
                        // A still-running previous firing just skips this one.
                        Err(Error::JobAlreadyRunning(_)) => {
                            tracing::info!(
                                "scheduler: job '{}' still running, skipping firing",
                                entry.job_id
                            )
                        }
                        Err(e) => {
                            tracing::error!("scheduler: job '{}' failed: {}", entry.job_id, e)
                        }
                    }
                }
            }));
        }

        futures::future::join_all(handles).await;
        Ok(())
    }
}
