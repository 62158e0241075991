//! Intra-item duplicate-variant cleanup.
//!
//! A single Plex catalog entry can carry several media versions (e.g. a
//! 1080p file and a 4K file under one movie). This collaborator deletes the
//! redundant versions, keeping the best one by the same preserve/resolution/
//! size heuristics the group resolver uses.

use crate::core::quality::{has_preserved_copy, resolution_priority};
use crate::error::{Error, Result, Subsystem};
use crate::models::config::DeletePreference;
use crate::models::media::MediaVariant;
use crate::services::plex::{MetadataDetails, PlexClient, PlexConfig};
use crate::services::{MediaServer, VariantCleanup};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request for one intra-item cleanup.
#[derive(Debug, Clone)]
pub struct VariantCleanupRequest {
    pub rating_key: String,
    pub dry_run: bool,
    pub delete_preference: DeletePreference,
    pub preserve_quality_terms: Vec<String>,
}

/// One variant-level deletion decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantDeletion {
    pub media_id: Option<i64>,
    pub deleted: bool,
}

/// Outcome of one intra-item cleanup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantCleanupOutcome {
    pub title: String,
    pub rating_key: String,
    pub deleted: u32,
    pub would_delete: u32,
    pub deletions: Vec<VariantDeletion>,
    pub tmdb_ids: Vec<u64>,
    pub year: Option<i32>,
}

/// Plex-backed variant cleaner. Shares the media-server client for metadata
/// reads; deletions target `/library/metadata/{ratingKey}/media/{mediaId}`.
pub struct PlexVariantCleaner {
    config: PlexConfig,
    client: reqwest::Client,
    plex: Arc<PlexClient>,
}

impl PlexVariantCleaner {
    pub fn new(config: PlexConfig, plex: Arc<PlexClient>) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            plex,
        }
    }

    async fn delete_media_version(&self, rating_key: &str, media_id: i64) -> Result<()> {
        let url = format!(
            "{}/library/metadata/{}/media/{}",
            self.config.base_url.trim_end_matches('/'),
            rating_key,
            media_id
        );
        let resp = self
            .client
            .delete(url)
            .header("X-Plex-Token", &self.config.token)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Error::service(
                Subsystem::Plex,
                format!(
                    "delete media {} of {} returned {}",
                    media_id,
                    rating_key,
                    resp.status()
                ),
            ));
        }
        Ok(())
    }

    async fn cleanup(
        &self,
        rating_key: &str,
        dry_run: bool,
        preference: DeletePreference,
        preserve_terms: &[String],
    ) -> Result<VariantCleanupOutcome> {
        let details = self.plex.get_metadata_details(rating_key).await?;
        let mut outcome = VariantCleanupOutcome {
            title: details.title.clone(),
            rating_key: rating_key.to_string(),
            deleted: 0,
            would_delete: 0,
            deletions: Vec::new(),
            tmdb_ids: details.tmdb_ids.clone(),
            year: details.year,
        };

        let versions = distinct_versions(&details);
        if versions.len() < 2 {
            return Ok(outcome);
        }

        let keep_id = pick_keep(&versions, preference, preserve_terms);
        for version in &versions {
            if version.media_id == keep_id {
                continue;
            }
            let Some(media_id) = version.media_id else {
                continue;
            };
            if dry_run {
                outcome.would_delete += 1;
                outcome.deletions.push(VariantDeletion {
                    media_id: Some(media_id),
                    deleted: false,
                });
                continue;
            }
            match self.delete_media_version(rating_key, media_id).await {
                Ok(()) => {
                    outcome.deleted += 1;
                    outcome.deletions.push(VariantDeletion {
                        media_id: Some(media_id),
                        deleted: true,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        "plex: variant delete failed item={} media={} err={}",
                        rating_key,
                        media_id,
                        e
                    );
                    outcome.deletions.push(VariantDeletion {
                        media_id: Some(media_id),
                        deleted: false,
                    });
                }
            }
        }

        Ok(outcome)
    }
}

/// Collapse per-part rows back into one row per media version.
fn distinct_versions(details: &MetadataDetails) -> Vec<MediaVariant> {
    let mut seen = std::collections::HashSet::new();
    let mut versions = Vec::new();
    for variant in &details.variants {
        let key = variant.media_id;
        if seen.insert(key) {
            versions.push(variant.clone());
        }
    }
    versions
}

/// Choose the media version to keep, mirroring the group resolver's chain at
/// variant granularity.
fn pick_keep(
    versions: &[MediaVariant],
    preference: DeletePreference,
    preserve_terms: &[String],
) -> Option<i64> {
    let any_preserved = versions
        .iter()
        .any(|v| has_preserved_copy(std::slice::from_ref(v), preserve_terms));

    let mut pool: Vec<&MediaVariant> = versions
        .iter()
        .filter(|v| !any_preserved || has_preserved_copy(std::slice::from_ref(v), preserve_terms))
        .collect();

    pool.sort_by(|a, b| {
        let by_preference = match preference {
            DeletePreference::SmallestFile => b
                .size_bytes
                .unwrap_or(u64::MAX)
                .cmp(&a.size_bytes.unwrap_or(u64::MAX)),
            DeletePreference::LargestFile => {
                a.size_bytes.unwrap_or(0).cmp(&b.size_bytes.unwrap_or(0))
            }
            // Versions carry no per-variant added-at; quality decides.
            _ => std::cmp::Ordering::Equal,
        };
        by_preference
            .then_with(|| {
                resolution_priority(b.video_resolution.as_deref())
                    .cmp(&resolution_priority(a.video_resolution.as_deref()))
            })
            .then_with(|| b.size_bytes.unwrap_or(0).cmp(&a.size_bytes.unwrap_or(0)))
            .then_with(|| a.media_id.cmp(&b.media_id))
    });

    pool.first().and_then(|v| v.media_id)
}

#[async_trait]
impl VariantCleanup for PlexVariantCleaner {
    async fn cleanup_movie_variants(
        &self,
        request: &VariantCleanupRequest,
    ) -> Result<VariantCleanupOutcome> {
        self.cleanup(
            &request.rating_key,
            request.dry_run,
            request.delete_preference,
            &request.preserve_quality_terms,
        )
        .await
    }

    async fn cleanup_episode_variants(
        &self,
        rating_key: &str,
        dry_run: bool,
    ) -> Result<VariantCleanupOutcome> {
        // Episodes have no delete preference; resolution and size decide.
        self.cleanup(rating_key, dry_run, DeletePreference::None, &[])
            .await
    }
}
