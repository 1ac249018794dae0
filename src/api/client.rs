//! Cache-backed NHL API client.
//!
//! Every fetch prefers an on-disk artifact keyed by the request parameters; a
//! successful network response is persisted to the cache before being
//! returned. Any failure along the way degrades to `None` with a log line so
//! the loader can skip that unit of work.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::season::SeasonId;
use crate::util::env::env_parse;

use super::types::{GameLogResponse, PlayByPlay, PlayerLanding, ScheduleResponse, TeamsResponse};
use super::Fetch;

const WEB_BASE_URL: &str = "https://api-web.nhle.com/v1";
const STATS_BASE_URL: &str = "https://api.nhle.com/stats/rest/en";

pub struct NhlClient {
    http: reqwest::Client,
    cache_dir: PathBuf,
    web_base: String,
    stats_base: String,
}

impl NhlClient {
    pub fn new(cache_dir: impl AsRef<Path>) -> Result<Self> {
        let timeout_secs: u64 = env_parse("FETCH_TIMEOUT_SECS", 30);
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            cache_dir: cache_dir.as_ref().to_path_buf(),
            web_base: WEB_BASE_URL.to_string(),
            stats_base: STATS_BASE_URL.to_string(),
        })
    }

    #[cfg(test)]
    pub fn with_base_urls(mut self, web: &str, stats: &str) -> Self {
        self.web_base = web.trim_end_matches('/').to_string();
        self.stats_base = stats.trim_end_matches('/').to_string();
        self
    }

    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{key}.json"))
    }

    fn read_cache<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.cache_path(key);
        let raw = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(parsed) => {
                debug!(key, "cache hit");
                Some(parsed)
            }
            Err(err) => {
                warn!(key, error = %err, "cached artifact unreadable; refetching");
                None
            }
        }
    }

    fn write_cache(&self, key: &str, value: &serde_json::Value) {
        if let Err(err) = std::fs::create_dir_all(&self.cache_dir) {
            warn!(error = %err, "cannot create cache dir; skipping cache write");
            return;
        }
        let pretty = match serde_json::to_string_pretty(value) {
            Ok(s) => s,
            Err(err) => {
                warn!(key, error = %err, "cannot serialize cache artifact");
                return;
            }
        };
        if let Err(err) = std::fs::write(self.cache_path(key), pretty) {
            warn!(key, error = %err, "cache write failed");
        }
    }

    /// Cache-then-network fetch of one JSON resource.
    async fn get_json<T: DeserializeOwned>(&self, key: &str, url: &str) -> Option<T> {
        if let Some(cached) = self.read_cache(key) {
            return Some(cached);
        }

        debug!(key, url, "fetching");
        let resp = match self.http.get(url).send().await {
            Ok(r) => r,
            Err(err) => {
                warn!(key, error = %err, "fetch failed");
                return None;
            }
        };
        if !resp.status().is_success() {
            warn!(key, status = %resp.status(), "fetch returned non-OK status");
            return None;
        }
        let raw: serde_json::Value = match resp.json().await {
            Ok(v) => v,
            Err(err) => {
                warn!(key, error = %err, "response body is not JSON");
                return None;
            }
        };

        self.write_cache(key, &raw);

        match serde_json::from_value(raw) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!(key, error = %err, "payload does not match expected shape");
                None
            }
        }
    }
}

#[async_trait]
impl Fetch for NhlClient {
    async fn teams(&self) -> Option<TeamsResponse> {
        let url = format!("{}/team", self.stats_base);
        self.get_json("teams", &url).await
    }

    async fn team_schedule(&self, tri_code: &str, season: SeasonId) -> Option<ScheduleResponse> {
        let key = format!("schedule_{tri_code}_{season}");
        let url = format!(
            "{}/club-schedule-season/{}/{}",
            self.web_base, tri_code, season
        );
        self.get_json(&key, &url).await
    }

    async fn play_by_play(&self, game_id: i64) -> Option<PlayByPlay> {
        let key = format!("gamecenter_{game_id}");
        let url = format!("{}/gamecenter/{}/play-by-play", self.web_base, game_id);
        self.get_json(&key, &url).await
    }

    async fn player_landing(&self, player_id: i64) -> Option<PlayerLanding> {
        let key = format!("player_{player_id}_landing");
        let url = format!("{}/player/{}/landing", self.web_base, player_id);
        self.get_json(&key, &url).await
    }

    async fn player_game_log(
        &self,
        player_id: i64,
        season: SeasonId,
    ) -> Option<GameLogResponse> {
        let key = format!("player_{player_id}_gamelog_{season}");
        let url = format!(
            "{}/player/{}/game-log/{}/{}",
            self.web_base,
            player_id,
            season,
            crate::REGULAR_SEASON
        );
        self.get_json(&key, &url).await
    }
}
