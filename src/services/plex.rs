//! Plex media-server client.
//!
//! Talks to the Plex HTTP API with `Accept: application/json`. All listing
//! endpoints go through `/library/sections`; item details and deletion go
//! through `/library/metadata/{ratingKey}`.

use crate::error::{Error, Result, Subsystem};
use crate::models::media::{EpisodeKey, MediaIdentity, MediaVariant};
use crate::services::MediaServer;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

/// Plex client configuration.
#[derive(Debug, Clone)]
pub struct PlexConfig {
    pub base_url: String,
    pub token: String,
}

/// Plex media-server client.
pub struct PlexClient {
    config: PlexConfig,
    client: reqwest::Client,
}

/// A library section.
#[derive(Debug, Clone)]
pub struct Section {
    pub key: String,
    pub title: String,
    /// `movie` or `show`.
    pub kind: String,
}

impl Section {
    pub fn is_movie(&self) -> bool {
        self.kind == "movie"
    }

    pub fn is_show(&self) -> bool {
        self.kind == "show"
    }
}

/// Movie listing row (bulk listing; no variant detail).
#[derive(Debug, Clone)]
pub struct MovieListing {
    pub rating_key: String,
    pub title: String,
    pub tmdb_id: Option<u64>,
    pub year: Option<i32>,
    pub added_at: Option<i64>,
}

/// TV show listing row.
#[derive(Debug, Clone)]
pub struct ShowListing {
    pub rating_key: String,
    pub title: String,
}

/// Episode listing row.
#[derive(Debug, Clone)]
pub struct EpisodeListing {
    pub rating_key: String,
    pub title: String,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

/// Full metadata for one item, including file variants.
#[derive(Debug, Clone)]
pub struct MetadataDetails {
    pub rating_key: String,
    pub title: String,
    pub year: Option<i32>,
    pub added_at: Option<i64>,
    pub tmdb_ids: Vec<u64>,
    pub tvdb_ids: Vec<u64>,
    pub grandparent_title: Option<String>,
    pub grandparent_rating_key: Option<String>,
    /// Season number for episodes.
    pub parent_index: Option<u32>,
    /// Episode number for episodes.
    pub index: Option<u32>,
    pub library_section_key: Option<String>,
    pub library_section_title: Option<String>,
    pub variants: Vec<MediaVariant>,
}

impl MetadataDetails {
    /// Project into the per-run identity model.
    pub fn to_identity(&self) -> MediaIdentity {
        MediaIdentity {
            rating_key: self.rating_key.clone(),
            title: self.title.clone(),
            year: self.year,
            tmdb_id: self.tmdb_ids.first().copied(),
            tvdb_id: self.tvdb_ids.first().copied(),
            added_at: self.added_at,
            library_section_key: self.library_section_key.clone().unwrap_or_default(),
            library_section_title: self.library_section_title.clone().unwrap_or_default(),
            variants: self.variants.clone(),
            show_title: self.grandparent_title.clone(),
            show_rating_key: self.grandparent_rating_key.clone(),
            season: self.parent_index,
            episode: self.index,
        }
    }
}

// ---- wire types ------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ContainerEnvelope {
    #[serde(rename = "MediaContainer")]
    media_container: MediaContainer,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct MediaContainer {
    #[serde(rename = "Directory")]
    directory: Vec<DirectoryEntry>,
    #[serde(rename = "Metadata")]
    metadata: Vec<MetadataEntry>,
}

#[derive(Debug, Deserialize)]
struct DirectoryEntry {
    key: String,
    title: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct MetadataEntry {
    #[serde(rename = "ratingKey")]
    rating_key: String,
    title: String,
    year: Option<i32>,
    #[serde(rename = "addedAt")]
    added_at: Option<i64>,
    #[serde(rename = "Guid")]
    guids: Vec<GuidEntry>,
    #[serde(rename = "grandparentTitle")]
    grandparent_title: Option<String>,
    #[serde(rename = "grandparentRatingKey")]
    grandparent_rating_key: Option<String>,
    #[serde(rename = "parentIndex")]
    parent_index: Option<u32>,
    index: Option<u32>,
    #[serde(rename = "librarySectionID")]
    library_section_id: Option<i64>,
    #[serde(rename = "librarySectionTitle")]
    library_section_title: Option<String>,
    #[serde(rename = "Media")]
    media: Vec<MediaEntry>,
}

#[derive(Debug, Deserialize)]
struct GuidEntry {
    id: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct MediaEntry {
    id: Option<i64>,
    #[serde(rename = "videoResolution")]
    video_resolution: Option<String>,
    #[serde(rename = "Part")]
    parts: Vec<PartEntry>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PartEntry {
    file: Option<String>,
    size: Option<u64>,
}

fn guid_id(guids: &[GuidEntry], scheme: &str) -> Vec<u64> {
    guids
        .iter()
        .filter_map(|g| g.id.strip_prefix(scheme))
        .filter_map(|rest| rest.parse().ok())
        .collect()
}

impl MetadataEntry {
    fn to_details(&self) -> MetadataDetails {
        let variants = self
            .media
            .iter()
            .flat_map(|m| {
                let media_id = m.id;
                let resolution = m.video_resolution.clone();
                if m.parts.is_empty() {
                    vec![MediaVariant {
                        media_id,
                        video_resolution: resolution.clone(),
                        size_bytes: None,
                        file_path: None,
                    }]
                } else {
                    m.parts
                        .iter()
                        .map(|p| MediaVariant {
                            media_id,
                            video_resolution: resolution.clone(),
                            size_bytes: p.size,
                            file_path: p.file.clone(),
                        })
                        .collect()
                }
            })
            .collect();

        MetadataDetails {
            rating_key: self.rating_key.clone(),
            title: self.title.clone(),
            year: self.year,
            added_at: self.added_at,
            tmdb_ids: guid_id(&self.guids, "tmdb://"),
            tvdb_ids: guid_id(&self.guids, "tvdb://"),
            grandparent_title: self.grandparent_title.clone(),
            grandparent_rating_key: self.grandparent_rating_key.clone(),
            parent_index: self.parent_index,
            index: self.index,
            library_section_key: self.library_section_id.map(|id| id.to_string()),
            library_section_title: self.library_section_title.clone(),
            variants,
        }
    }
}

// ---- client ----------------------------------------------------------------

impl PlexClient {
    pub fn new(config: PlexConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn get_container(&self, path: &str) -> Result<MediaContainer> {
        let resp = self
            .client
            .get(self.url(path))
            .header("X-Plex-Token", &self.config.token)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::service(
                Subsystem::Plex,
                format!("GET {} returned {}", path, resp.status()),
            ));
        }

        let envelope: ContainerEnvelope = resp.json().await?;
        Ok(envelope.media_container)
    }

    async fn list_metadata(&self, path: &str) -> Result<Vec<MetadataEntry>> {
        Ok(self.get_container(path).await?.metadata)
    }
}

#[async_trait]
impl MediaServer for PlexClient {
    async fn list_sections(&self) -> Result<Vec<Section>> {
        let container = self.get_container("/library/sections").await?;
        Ok(container
            .directory
            .into_iter()
            .map(|d| Section {
                key: d.key,
                title: d.title,
                kind: d.kind.unwrap_or_default(),
            })
            .collect())
    }

    async fn list_movies(
        &self,
        section_key: &str,
        duplicate_only: bool,
    ) -> Result<Vec<MovieListing>> {
        let dup = if duplicate_only { "&duplicate=1" } else { "" };
        let path = format!(
            "/library/sections/{}/all?type=1&includeGuids=1{}",
            section_key, dup
        );
        let entries = self.list_metadata(&path).await?;
        Ok(entries
            .into_iter()
            .map(|e| MovieListing {
                tmdb_id: guid_id(&e.guids, "tmdb://").first().copied(),
                rating_key: e.rating_key,
                title: e.title,
                year: e.year,
                added_at: e.added_at,
            })
            .collect())
    }

    async fn list_duplicate_movie_rating_keys(&self, section_key: &str) -> Result<Vec<String>> {
        let path = format!("/library/sections/{}/all?type=1&duplicate=1", section_key);
        let entries = self.list_metadata(&path).await?;
        Ok(entries.into_iter().map(|e| e.rating_key).collect())
    }

    async fn list_duplicate_episode_rating_keys(&self, section_key: &str) -> Result<Vec<String>> {
        let path = format!("/library/sections/{}/all?type=4&duplicate=1", section_key);
        let entries = self.list_metadata(&path).await?;
        Ok(entries.into_iter().map(|e| e.rating_key).collect())
    }

    async fn list_tv_shows(&self, section_key: &str) -> Result<Vec<ShowListing>> {
        let path = format!("/library/sections/{}/all?type=2", section_key);
        let entries = self.list_metadata(&path).await?;
        Ok(entries
            .into_iter()
            .map(|e| ShowListing {
                rating_key: e.rating_key,
                title: e.title,
            })
            .collect())
    }

    async fn list_episodes_for_show(
        &self,
        show_rating_key: &str,
        duplicate_only: bool,
    ) -> Result<Vec<EpisodeListing>> {
        let dup = if duplicate_only { "?duplicate=1" } else { "" };
        let path = format!("/library/metadata/{}/allLeaves{}", show_rating_key, dup);
        let entries = self.list_metadata(&path).await?;
        Ok(entries
            .into_iter()
            .map(|e| EpisodeListing {
                rating_key: e.rating_key,
                title: e.title,
                season: e.parent_index,
                episode: e.index,
            })
            .collect())
    }

    async fn get_metadata_details(&self, rating_key: &str) -> Result<MetadataDetails> {
        let path = format!("/library/metadata/{}?includeGuids=1", rating_key);
        let entries = self.list_metadata(&path).await?;
        entries
            .first()
            .map(|e| e.to_details())
            .ok_or_else(|| Error::service(Subsystem::Plex, format!("metadata {} not found", rating_key)))
    }

    async fn delete_metadata(&self, rating_key: &str) -> Result<()> {
        let path = format!("/library/metadata/{}", rating_key);
        let resp = self
            .client
            .delete(self.url(&path))
            .header("X-Plex-Token", &self.config.token)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::service(
                Subsystem::Plex,
                format!("delete {} returned {}", rating_key, resp.status()),
            ));
        }
        Ok(())
    }

    async fn tvdb_show_map(&self, section_key: &str) -> Result<HashMap<u64, String>> {
        let path = format!("/library/sections/{}/all?type=2&includeGuids=1", section_key);
        let entries = self.list_metadata(&path).await?;
        let mut map = HashMap::new();
        for entry in entries {
            if let Some(tvdb) = guid_id(&entry.guids, "tvdb://").first() {
                map.insert(*tvdb, entry.rating_key);
            }
        }
        Ok(map)
    }

    async fn episodes_set(&self, show_rating_key: &str) -> Result<HashSet<EpisodeKey>> {
        let episodes = self.list_episodes_for_show(show_rating_key, false).await?;
        Ok(episodes
            .into_iter()
            .filter_map(|e| match (e.season, e.episode) {
                (Some(s), Some(ep)) => Some(EpisodeKey::new(s, ep)),
                _ => None,
            })
            .collect())
    }

    async fn find_movie_rating_key_by_title(
        &self,
        section_key: &str,
        title: &str,
    ) -> Result<Option<String>> {
        use crate::core::matching::normalize_title;

        let path = format!(
            "/library/sections/{}/all?type=1&title={}",
            section_key,
            urlencoding::encode(title)
        );
        let entries = self.list_metadata(&path).await?;
        let wanted = normalize_title(title);
        Ok(entries
            .into_iter()
            .find(|e| normalize_title(&e.title) == wanted)
            .map(|e| e.rating_key))
    }
}
