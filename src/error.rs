//! Error types for curatarr.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Which external system an error originated from.
///
/// Drives the warning-string prefixes in run summaries and the
/// report projector's connectivity-noise suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsystem {
    Plex,
    Radarr,
    Sonarr,
}

impl Subsystem {
    /// Lowercase prefix used in summary warning strings, e.g. `"radarr"`.
    pub fn prefix(&self) -> &'static str {
        match self {
            Subsystem::Plex => "plex",
            Subsystem::Radarr => "radarr",
            Subsystem::Sonarr => "sonarr",
        }
    }
}

/// Main error type for curatarr.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors: the only category that aborts a whole run
    #[error("Plex is not configured: set plex.base_url and the Plex token")]
    PlexNotConfigured,

    #[error("Configuration error: {0}")]
    Config(String),

    // Per-service request failures, recovered at the call site
    #[error("plex: {0}")]
    Plex(String),

    #[error("radarr: {0}")]
    Radarr(String),

    #[error("sonarr: {0}")]
    Sonarr(String),

    // Job harness errors
    #[error("Job '{0}' is already running")]
    JobAlreadyRunning(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid run record: {0}")]
    InvalidRunRecord(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Wrap a message as a per-service failure.
    pub fn service<S: Into<String>>(subsystem: Subsystem, msg: S) -> Self {
        match subsystem {
            Subsystem::Plex => Error::Plex(msg.into()),
            Subsystem::Radarr => Error::Radarr(msg.into()),
            Subsystem::Sonarr => Error::Sonarr(msg.into()),
        }
    }

    /// The external system this error came from, if any.
    pub fn subsystem(&self) -> Option<Subsystem> {
        match self {
            Error::Plex(_) => Some(Subsystem::Plex),
            Error::Radarr(_) => Some(Subsystem::Radarr),
            Error::Sonarr(_) => Some(Subsystem::Sonarr),
            _ => None,
        }
    }

    /// Whether this error must abort an entire run.
    ///
    /// Everything except missing configuration is recovered per item.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::PlexNotConfigured | Error::Config(_))
    }
}
