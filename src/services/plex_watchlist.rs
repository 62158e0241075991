//! Plex watchlist client.
//!
//! The watchlist lives on the Plex discover service, not the local server.
//! Title matching here mirrors the per-item flows: normalized equality with
//! an optional year gate for movies.

use crate::core::matching::normalize_title;
use crate::error::{Error, Result, Subsystem};
use crate::models::media::{WatchlistEntry, WatchlistKind};
use crate::services::WatchlistService;
use async_trait::async_trait;
use serde::Deserialize;

const DISCOVER_BASE_URL: &str = "https://discover.provider.plex.tv";

/// Plex watchlist client.
pub struct PlexWatchlistClient {
    token: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct WatchlistEnvelope {
    #[serde(rename = "MediaContainer")]
    media_container: WatchlistContainer,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct WatchlistContainer {
    #[serde(rename = "Metadata")]
    metadata: Vec<WatchlistRow>,
}

#[derive(Debug, Deserialize)]
struct WatchlistRow {
    #[serde(rename = "ratingKey")]
    rating_key: String,
    title: String,
    year: Option<i32>,
}

impl PlexWatchlistClient {
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, DISCOVER_BASE_URL.to_string())
    }

    /// Used by tests to point at a fake discover endpoint.
    pub fn with_base_url(token: String, base_url: String) -> Self {
        Self {
            token,
            base_url,
            client: reqwest::Client::new(),
        }
    }

    async fn remove_entry(&self, rating_key: &str) -> Result<bool> {
        let url = format!(
            "{}/actions/removeFromWatchlist?ratingKey={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(rating_key)
        );
        let resp = self
            .client
            .put(url)
            .header("X-Plex-Token", &self.token)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::service(
                Subsystem::Plex,
                format!("watchlist remove {} returned {}", rating_key, resp.status()),
            ));
        }
        Ok(true)
    }

    async fn remove_matching(
        &self,
        kind: WatchlistKind,
        title: &str,
        year: Option<i32>,
        dry_run: bool,
    ) -> Result<bool> {
        let entries = self.list_watchlist(kind).await?;
        let wanted = normalize_title(title);
        let matches: Vec<&WatchlistEntry> = entries
            .iter()
            .filter(|e| {
                normalize_title(&e.title) == wanted
                    && (year.is_none() || e.year.is_none() || e.year == year)
            })
            .collect();

        if matches.is_empty() {
            return Ok(false);
        }

        if dry_run {
            tracing::info!(
                "watchlist: would remove {} matching entr(ies) title={:?}",
                matches.len(),
                title
            );
            return Ok(true);
        }

        let mut removed_any = false;
        for entry in matches {
            match self.remove_entry(&entry.rating_key).await {
                Ok(_) => {
                    tracing::info!(
                        "watchlist: removed title={:?} year={:?}",
                        entry.title,
                        entry.year
                    );
                    removed_any = true;
                }
                Err(e) => {
                    tracing::warn!("watchlist: remove failed title={:?} err={}", entry.title, e)
                }
            }
        }
        Ok(removed_any)
    }
}

#[async_trait]
impl WatchlistService for PlexWatchlistClient {
    async fn list_watchlist(&self, kind: WatchlistKind) -> Result<Vec<WatchlistEntry>> {
        let type_param = match kind {
            WatchlistKind::Movie => 1,
            WatchlistKind::Show => 2,
        };
        let url = format!(
            "{}/library/sections/watchlist/all?type={}",
            self.base_url.trim_end_matches('/'),
            type_param
        );
        let resp = self
            .client
            .get(url)
            .header("X-Plex-Token", &self.token)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::service(
                Subsystem::Plex,
                format!("watchlist listing returned {}", resp.status()),
            ));
        }

        let envelope: WatchlistEnvelope = resp.json().await?;
        Ok(envelope
            .media_container
            .metadata
            .into_iter()
            .map(|row| WatchlistEntry {
                rating_key: row.rating_key,
                title: row.title,
                year: row.year,
                kind,
            })
            .collect())
    }

    async fn remove_by_rating_key(&self, rating_key: &str) -> Result<bool> {
        self.remove_entry(rating_key).await
    }

    async fn remove_movie_by_title(
        &self,
        title: &str,
        year: Option<i32>,
        dry_run: bool,
    ) -> Result<bool> {
        self.remove_matching(WatchlistKind::Movie, title, year, dry_run)
            .await
    }

    async fn remove_show_by_title(&self, title: &str, dry_run: bool) -> Result<bool> {
        self.remove_matching(WatchlistKind::Show, title, None, dry_run)
            .await
    }
}
