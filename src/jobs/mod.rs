//! Job harness: run records, single-flight execution and scheduling.

pub mod record;
pub mod scheduler;
pub mod service;

pub use record::{RunRecord, RunStatus, RunStore};
pub use scheduler::{ScheduleEntry, Scheduler};
pub use service::{JobsService, CLEANUP_JOB_ID};
