//! Durable run records.
//!
//! Every job invocation gets one JSON file under the runs directory. Records
//! are written whole via a temp-file rename so a crash never leaves a
//! half-written record behind.

use crate::error::{Error, Result};
use crate::models::media::Trigger;
use crate::models::report::JobReport;
use crate::models::summary::Progress;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Terminal or in-flight status of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Succeeded,
    Failed,
}

/// One persisted job run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: String,
    pub job_id: String,
    pub status: RunStatus,
    pub trigger: Trigger,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Last live progress marker while the run is in flight.
    pub progress: Option<Progress>,
    /// Fatal error message, for failed runs.
    pub error: Option<String>,
    /// Frozen run summary, attached at completion.
    pub summary: Option<serde_json::Value>,
    /// Versioned report, attached at completion.
    pub report: Option<JobReport>,
}

impl RunRecord {
    pub fn new(job_id: &str, trigger: Trigger, dry_run: bool) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            job_id: job_id.to_string(),
            status: RunStatus::Running,
            trigger,
            dry_run,
            started_at: Utc::now(),
            finished_at: None,
            progress: None,
            error: None,
            summary: None,
            report: None,
        }
    }
}

/// JSON-file store for run records.
#[derive(Debug, Clone)]
pub struct RunStore {
    dir: PathBuf,
}

impl RunStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, run_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", run_id))
    }

    pub fn save(&self, record: &RunRecord) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!("{}.json.tmp", record.run_id));
        let json = serde_json::to_string_pretty(record)?;
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, self.path_for(&record.run_id))?;
        Ok(())
    }

    pub fn load(&self, run_id: &str) -> Result<RunRecord> {
        let path = self.path_for(run_id);
        if !path.exists() {
            return Err(Error::RunNotFound(run_id.to_string()));
        }
        let content = std::fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::InvalidRunRecord(format!("{}: {}", run_id, e)))
    }

    /// All records, newest first. Unreadable files are skipped with a warning
    /// so one corrupt record cannot hide the rest.
    pub fn list(&self) -> Result<Vec<RunRecord>> {
        let mut records = Vec::new();
        if !self.dir.exists() {
            return Ok(records);
        }
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("jobs: unreadable run record {:?}: {}", path, e);
                    continue;
                }
            };
            match serde_json::from_str::<RunRecord>(&content) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("jobs: invalid run record {:?}: {}", path, e),
            }
        }
        records.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(records)
    }
}
