//! The stable `jobReportV1` output contract consumed by the UI.

use serde::{Deserialize, Serialize};

pub const REPORT_TEMPLATE: &str = "jobReportV1";
pub const REPORT_VERSION: u32 = 1;

/// Tri-state outcome of one feature-area task card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Success,
    Skipped,
    Failed,
}

/// Issue severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warn,
    Error,
}

/// A user-visible issue extracted from the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
}

/// One labeled value on a task card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fact {
    pub label: String,
    pub value: serde_json::Value,
}

impl Fact {
    pub fn new(label: &str, value: impl Into<serde_json::Value>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

/// Per-feature task card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCard {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub facts: Vec<Fact>,
    pub issues: Vec<Issue>,
}

/// Grouping of task cards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub task_ids: Vec<String>,
}

/// Versioned, replayable job report.
///
/// `raw` always embeds the full run summary so the UI side of the contract
/// can evolve without losing debugging detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub template: String,
    pub version: u32,
    pub job_id: String,
    pub dry_run: bool,
    pub trigger: String,
    pub headline: String,
    pub sections: Vec<Section>,
    pub tasks: Vec<TaskCard>,
    pub issues: Vec<Issue>,
    pub raw: serde_json::Value,
}

impl JobReport {
    /// Whether any task card failed. The job harness uses this to override
    /// the run's terminal status even when no exception was thrown.
    pub fn has_failed_task(&self) -> bool {
        self.tasks.iter().any(|t| t.status == TaskStatus::Failed)
    }
}
