//! Media data model: identities, variants and reconciliation requests.

use serde::{Deserialize, Serialize};

/// One copy of a movie or episode as seen in the media server.
///
/// Multiple identities can represent the same logical content (duplicates).
/// Rebuilt per run from live listings; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaIdentity {
    /// Plex's opaque per-item identifier.
    pub rating_key: String,
    pub title: String,
    pub year: Option<i32>,
    pub tmdb_id: Option<u64>,
    pub tvdb_id: Option<u64>,
    /// Unix timestamp the item was added to the library.
    pub added_at: Option<i64>,
    pub library_section_key: String,
    pub library_section_title: String,
    /// Physical files/versions backing this identity.
    pub variants: Vec<MediaVariant>,
    /// Show title for episodes.
    pub show_title: Option<String>,
    /// Show rating key for episodes.
    pub show_rating_key: Option<String>,
    /// Season number for episodes.
    pub season: Option<u32>,
    /// Episode number within the season.
    pub episode: Option<u32>,
}

/// One physical file/version backing a [`MediaIdentity`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaVariant {
    pub media_id: Option<i64>,
    pub video_resolution: Option<String>,
    pub size_bytes: Option<u64>,
    pub file_path: Option<String>,
}

/// Season/episode pair identifying an episode within a show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EpisodeKey {
    pub season: u32,
    pub episode: u32,
}

impl EpisodeKey {
    pub fn new(season: u32, episode: u32) -> Self {
        Self { season, episode }
    }

    /// Specials live in season 0 and are excluded from completeness checks.
    pub fn is_special(&self) -> bool {
        self.season == 0
    }
}

impl std::fmt::Display for EpisodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "S{:02}E{:02}", self.season, self.episode)
    }
}

/// Kind of watchlist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchlistKind {
    Movie,
    Show,
}

/// An entry in the user's watch-later list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub rating_key: String,
    pub title: String,
    pub year: Option<i32>,
    pub kind: WatchlistKind,
}

/// What started a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Manual,
    Schedule,
    Auto,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Trigger::Manual => "manual",
            Trigger::Schedule => "schedule",
            Trigger::Auto => "auto",
        };
        f.write_str(s)
    }
}

/// Raw webhook/manual payload. All fields optional; a manual trigger always
/// carries an empty input and therefore runs the full sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CleanupInput {
    pub media_type: Option<String>,
    pub title: Option<String>,
    pub year: Option<i32>,
    pub rating_key: Option<String>,
    #[serde(alias = "grandparentTitle")]
    pub show_title: Option<String>,
    #[serde(alias = "grandparentRatingKey")]
    pub show_rating_key: Option<String>,
    pub season_number: Option<u32>,
    pub episode_number: Option<u32>,
    pub tvdb_id: Option<u64>,
    pub tmdb_id: Option<u64>,
    pub plex_event: Option<String>,
    pub persisted_path: Option<String>,
}

/// The shape of work a cleanup run performs, dispatched by pattern matching
/// instead of scattered media-type conditionals.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconciliationRequest {
    /// No media type supplied: scan entire libraries.
    FullSweep,
    Movie {
        title: Option<String>,
        year: Option<i32>,
        rating_key: Option<String>,
        tmdb_id: Option<u64>,
    },
    Show {
        title: Option<String>,
        rating_key: Option<String>,
        tvdb_id: Option<u64>,
    },
    Season {
        show_title: Option<String>,
        show_rating_key: Option<String>,
        tvdb_id: Option<u64>,
        season: u32,
    },
    Episode {
        show_title: Option<String>,
        show_rating_key: Option<String>,
        tvdb_id: Option<u64>,
        season: u32,
        episode: u32,
    },
    /// Media type present but not one we handle; marked skipped, not failed.
    Unsupported { media_type: String },
}

impl ReconciliationRequest {
    /// Build a request from a payload. Unknown media types are preserved so
    /// the run can record an explicit skip.
    pub fn from_input(input: &CleanupInput) -> Self {
        let media_type = input
            .media_type
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_default();

        match media_type.as_str() {
            "" => ReconciliationRequest::FullSweep,
            "movie" => ReconciliationRequest::Movie {
                title: input.title.clone(),
                year: input.year,
                rating_key: input.rating_key.clone(),
                tmdb_id: input.tmdb_id,
            },
            "show" => ReconciliationRequest::Show {
                title: input.show_title.clone().or_else(|| input.title.clone()),
                rating_key: input
                    .show_rating_key
                    .clone()
                    .or_else(|| input.rating_key.clone()),
                tvdb_id: input.tvdb_id,
            },
            "season" => match input.season_number {
                Some(season) => ReconciliationRequest::Season {
                    show_title: input.show_title.clone().or_else(|| input.title.clone()),
                    show_rating_key: input.show_rating_key.clone(),
                    tvdb_id: input.tvdb_id,
                    season,
                },
                None => ReconciliationRequest::Unsupported {
                    media_type: "season (missing seasonNumber)".to_string(),
                },
            },
            "episode" => match (input.season_number, input.episode_number) {
                (Some(season), Some(episode)) => ReconciliationRequest::Episode {
                    show_title: input.show_title.clone().or_else(|| input.title.clone()),
                    show_rating_key: input.show_rating_key.clone(),
                    tvdb_id: input.tvdb_id,
                    season,
                    episode,
                },
                _ => ReconciliationRequest::Unsupported {
                    media_type: "episode (missing season/episode number)".to_string(),
                },
            },
            other => ReconciliationRequest::Unsupported {
                media_type: other.to_string(),
            },
        }
    }

    /// Stable mode label used in summaries and reports.
    pub fn mode(&self) -> &'static str {
        match self {
            ReconciliationRequest::FullSweep => "full_sweep",
            ReconciliationRequest::Movie { .. } => "movie",
            ReconciliationRequest::Show { .. } => "show",
            ReconciliationRequest::Season { .. } => "season",
            ReconciliationRequest::Episode { .. } => "episode",
            ReconciliationRequest::Unsupported { .. } => "unsupported",
        }
    }
}
