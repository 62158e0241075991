//! Curatarr library
//!
//! A taste-curation automation layer that reconciles state across Plex,
//! Radarr and Sonarr: duplicate cleanup, monitor-flag synchronization and
//! watchlist reconciliation, driven by a small job harness.

pub mod cli;
pub mod core;
pub mod error;
pub mod jobs;
pub mod models;
pub mod services;

pub use error::{Error, Result};
