//! Core reconciliation logic: pure matching/resolution helpers and the
//! engine that drives them against the service collaborators.

pub mod cleanup;
pub mod matching;
pub mod quality;
pub mod report;
pub mod resolver;

pub use cleanup::{CleanupEngine, JobContext};
