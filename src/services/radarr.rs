//! Radarr API client (v3).

use crate::error::{Error, Result, Subsystem};
use crate::services::MovieMonitor;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Radarr client configuration.
#[derive(Debug, Clone)]
pub struct RadarrConfig {
    pub base_url: String,
    pub api_key: String,
}

/// Radarr movie row. Monitor updates are full-object PUTs, so unknown
/// fields are carried through `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarrMovie {
    pub id: i64,
    pub title: String,
    pub tmdb_id: Option<u64>,
    pub year: Option<i32>,
    pub monitored: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Radarr API client.
pub struct RadarrClient {
    config: RadarrConfig,
    client: reqwest::Client,
}

impl RadarrClient {
    pub fn new(config: RadarrConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v3{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl MovieMonitor for RadarrClient {
    async fn list_movies(&self) -> Result<Vec<RadarrMovie>> {
        let resp = self
            .client
            .get(self.url("/movie"))
            .header("X-Api-Key", &self.config.api_key)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::service(
                Subsystem::Radarr,
                format!("movie listing returned {}", resp.status()),
            ));
        }
        Ok(resp.json().await?)
    }

    async fn set_movie_monitored(&self, movie: &RadarrMovie, monitored: bool) -> Result<bool> {
        if movie.monitored == monitored {
            return Ok(false);
        }

        let mut updated = movie.clone();
        updated.monitored = monitored;

        let resp = self
            .client
            .put(self.url(&format!("/movie/{}", movie.id)))
            .header("X-Api-Key", &self.config.api_key)
            .json(&updated)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::service(
                Subsystem::Radarr,
                format!(
                    "monitor update for '{}' returned {}",
                    movie.title,
                    resp.status()
                ),
            ));
        }
        Ok(true)
    }

    async fn search_monitored_movies(&self) -> Result<()> {
        let body = serde_json::json!({ "name": "MissingMoviesSearch" });
        let resp = self
            .client
            .post(self.url("/command"))
            .header("X-Api-Key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::service(
                Subsystem::Radarr,
                format!("search command returned {}", resp.status()),
            ));
        }
        Ok(())
    }
}
