pub mod client;
pub mod types;

pub use client::NhlClient;

use async_trait::async_trait;

use crate::season::SeasonId;
use types::{GameLogResponse, PlayByPlay, PlayerLanding, ScheduleResponse, TeamsResponse};

/// Fetcher capability consumed by the batch loader.
///
/// Every operation returns `None` on any failure (not found, network error,
/// malformed payload): absence is "skip this unit of work", never a fault.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn teams(&self) -> Option<TeamsResponse>;
    async fn team_schedule(&self, tri_code: &str, season: SeasonId) -> Option<ScheduleResponse>;
    async fn play_by_play(&self, game_id: i64) -> Option<PlayByPlay>;
    async fn player_landing(&self, player_id: i64) -> Option<PlayerLanding>;
    async fn player_game_log(&self, player_id: i64, season: SeasonId)
        -> Option<GameLogResponse>;
}
