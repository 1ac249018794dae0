pub mod api;
pub mod db;
pub mod ingest;
pub mod season;
pub mod trace;

pub mod util {
    pub mod env;
}

/// Upstream game-type code for regular-season games. Preseason (1) and
/// playoff (3) games are filtered out before any play-by-play fetch.
pub const REGULAR_SEASON: i32 = 2;
