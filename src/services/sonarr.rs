//! Sonarr API client (v3).

use crate::error::{Error, Result, Subsystem};
use crate::services::EpisodeMonitor;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Sonarr client configuration.
#[derive(Debug, Clone)]
pub struct SonarrConfig {
    pub base_url: String,
    pub api_key: String,
}

/// One season within a series. Season monitor flags are updated by PUTting
/// the whole series object with a modified seasons array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SonarrSeason {
    pub season_number: u32,
    pub monitored: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Sonarr series row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SonarrSeries {
    pub id: i64,
    pub title: String,
    pub tvdb_id: Option<u64>,
    pub monitored: bool,
    #[serde(default)]
    pub seasons: Vec<SonarrSeason>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Sonarr episode row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SonarrEpisode {
    pub id: i64,
    pub series_id: i64,
    pub season_number: u32,
    pub episode_number: u32,
    pub monitored: bool,
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Sonarr API client.
pub struct SonarrClient {
    config: SonarrConfig,
    client: reqwest::Client,
}

impl SonarrClient {
    pub fn new(config: SonarrConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v3{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self
            .client
            .get(self.url(path))
            .header("X-Api-Key", &self.config.api_key)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::service(
                Subsystem::Sonarr,
                format!("GET {} returned {}", path, resp.status()),
            ));
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl EpisodeMonitor for SonarrClient {
    async fn list_series(&self) -> Result<Vec<SonarrSeries>> {
        self.get_json("/series").await
    }

    async fn get_series(&self, series_id: i64) -> Result<SonarrSeries> {
        self.get_json(&format!("/series/{}", series_id)).await
    }

    async fn episodes_by_series(&self, series_id: i64) -> Result<Vec<SonarrEpisode>> {
        self.get_json(&format!("/episode?seriesId={}", series_id))
            .await
    }

    async fn set_episode_monitored(
        &self,
        episode: &SonarrEpisode,
        monitored: bool,
    ) -> Result<bool> {
        if episode.monitored == monitored {
            return Ok(false);
        }

        let body = serde_json::json!({
            "episodeIds": [episode.id],
            "monitored": monitored,
        });
        let resp = self
            .client
            .put(self.url("/episode/monitor"))
            .header("X-Api-Key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::service(
                Subsystem::Sonarr,
                format!(
                    "episode monitor update S{:02}E{:02} returned {}",
                    episode.season_number,
                    episode.episode_number,
                    resp.status()
                ),
            ));
        }
        Ok(true)
    }

    async fn update_series(&self, series: &SonarrSeries) -> Result<()> {
        let resp = self
            .client
            .put(self.url(&format!("/series/{}", series.id)))
            .header("X-Api-Key", &self.config.api_key)
            .json(series)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::service(
                Subsystem::Sonarr,
                format!(
                    "series update '{}' returned {}",
                    series.title,
                    resp.status()
                ),
            ));
        }
        Ok(())
    }

    async fn search_monitored_episodes(&self) -> Result<()> {
        let body = serde_json::json!({ "name": "MissingEpisodeSearch" });
        let resp = self
            .client
            .post(self.url("/command"))
            .header("X-Api-Key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::service(
                Subsystem::Sonarr,
                format!("search command returned {}", resp.status()),
            ));
        }
        Ok(())
    }
}
