//! Job execution harness.
//!
//! Guarantees at most one in-flight run per job id, persists a run record
//! through its lifecycle (running -> succeeded/failed) and recovers records
//! orphaned by a crash of a previous process.

use crate::core::cleanup::{CleanupEngine, JobContext};
use crate::core::report::build_report;
use crate::error::{Error, Result};
use crate::jobs::record::{RunRecord, RunStatus, RunStore};
use crate::models::media::{ReconciliationRequest, Trigger};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Well-known job id of the cleanup job.
pub const CLEANUP_JOB_ID: &str = "cleanup";

pub struct JobsService {
    store: RunStore,
    running: Mutex<HashSet<String>>,
    boot_time: DateTime<Utc>,
}

impl JobsService {
    pub fn new(runs_dir: PathBuf) -> Self {
        Self {
            store: RunStore::new(runs_dir),
            running: Mutex::new(HashSet::new()),
            boot_time: Utc::now(),
        }
    }

    /// Mark stale `running` records from before this process started as
    /// failed. Call once at startup, before accepting work.
    pub fn recover_orphans(&self) -> Result<u32> {
        let mut recovered = 0;
        for mut record in self.store.list()? {
            if record.status == RunStatus::Running && record.started_at < self.boot_time {
                tracing::warn!(
                    "jobs: recovering orphaned run {} of job '{}'",
                    record.run_id,
                    record.job_id
                );
                record.status = RunStatus::Failed;
                record.finished_at = Some(Utc::now());
                record.error = Some("orphaned by process restart".to_string());
                self.store.save(&record)?;
                recovered += 1;
            }
        }
        Ok(recovered)
    }

    /// Persist a failed run for a job that could not start at all, so
    /// configuration errors still leave a record in the run history.
    pub fn record_failure(
        &self,
        job_id: &str,
        trigger: Trigger,
        dry_run: bool,
        error: &Error,
    ) -> Result<RunRecord> {
        let mut record = RunRecord::new(job_id, trigger, dry_run);
        record.status = RunStatus::Failed;
        record.finished_at = Some(Utc::now());
        record.error = Some(error.to_string());
        self.store.save(&record)?;
        tracing::error!(
            "jobs: run {} of '{}' failed before start: {}",
            record.run_id,
            job_id,
            error
        );
        Ok(record)
    }

    pub fn list_runs(&self) -> Result<Vec<RunRecord>> {
        self.store.list()
    }

    pub fn get_run(&self, run_id: &str) -> Result<RunRecord> {
        self.store.load(run_id)
    }

    fn acquire(&self, job_id: &str) -> Result<()> {
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        if !running.insert(job_id.to_string()) {
            return Err(Error::JobAlreadyRunning(job_id.to_string()));
        }
        Ok(())
    }

    fn release(&self, job_id: &str) {
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        running.remove(job_id);
    }

    /// Run one cleanup job end to end.
    ///
    /// A concurrent request for the same job id gets [`Error::JobAlreadyRunning`]
    /// instead of a second run. The returned record is terminal; a report
    /// with any failed task card forces the run status to failed even when
    /// the engine returned normally.
    pub async fn execute_cleanup(
        &self,
        job_id: &str,
        engine: &CleanupEngine,
        request: ReconciliationRequest,
        trigger: Trigger,
        dry_run: bool,
    ) -> Result<RunRecord> {
        self.acquire(job_id)?;
        let result = self
            .execute_locked(job_id, engine, request, trigger, dry_run)
            .await;
        self.release(job_id);
        result
    }

    async fn execute_locked(
        &self,
        job_id: &str,
        engine: &CleanupEngine,
        request: ReconciliationRequest,
        trigger: Trigger,
        dry_run: bool,
    ) -> Result<RunRecord> {
        let mut record = RunRecord::new(job_id, trigger, dry_run);
        self.store.save(&record)?;
        tracing::info!("jobs: run {} of '{}' started", record.run_id, job_id);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let ctx = JobContext::new(dry_run, trigger).with_progress(tx);

        // Persist progress markers as they arrive so `jobs show` on a live
        // run reflects where it is.
        let progress_store = self.store.clone();
        let progress_run_id = record.run_id.clone();
        let persister = tokio::spawn(async move {
            while let Some(progress) = rx.recv().await {
                if let Ok(mut live) = progress_store.load(&progress_run_id) {
                    live.progress = Some(progress);
                    if let Err(e) = progress_store.save(&live) {
                        tracing::warn!("jobs: progress persist failed: {}", e);
                    }
                }
            }
        });

        let outcome = engine.run(&ctx, request).await;
        drop(ctx);
        let _ = persister.await;

        record.finished_at = Some(Utc::now());
        match outcome {
            Ok(summary) => {
                let report = build_report(job_id, &summary);
                record.status = if report.has_failed_task() {
                    RunStatus::Failed
                } else {
                    RunStatus::Succeeded
                };
                record.progress = summary.progress.clone();
                record.summary = serde_json::to_value(&summary).ok();
                record.report = Some(report);
                self.store.save(&record)?;
                tracing::info!(
                    "jobs: run {} finished status={:?}",
                    record.run_id,
                    record.status
                );
                Ok(record)
            }
            Err(e) => {
                record.status = RunStatus::Failed;
                record.error = Some(e.to_string());
                self.store.save(&record)?;
                tracing::error!("jobs: run {} failed: {}", record.run_id, e);
                Err(e)
            }
        }
    }
}
