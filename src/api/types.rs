//! Upstream NHL API shapes (minimal).
//! Only the fields actually inspected by the ingest logic are modeled; all
//! others are ignored. Optional wrappers reflect sporadic omissions in
//! upstream responses.

use serde::Deserialize;

/// Localized text object (`{"default": "...", "fr": "..."}`); only the
/// default rendering is ingested.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalizedName {
    pub default: String,
}

// ---------- team directory ----------

#[derive(Debug, Deserialize)]
pub struct TeamsResponse {
    pub data: Vec<TeamRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRecord {
    pub id: i64,
    pub full_name: String,
    pub tri_code: String,
}

// ---------- club schedule ----------

#[derive(Debug, Deserialize)]
pub struct ScheduleResponse {
    #[serde(default)]
    pub games: Vec<ScheduledGame>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledGame {
    pub id: i64,
    pub game_type: i32,
}

// ---------- gamecenter play-by-play ----------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayByPlay {
    pub id: i64,
    pub season: i64,
    pub game_type: i32,
    pub limited_scoring: bool,
    pub game_date: String,
    pub venue: LocalizedName,
    pub venue_location: LocalizedName,
    #[serde(rename = "startTimeUTC")]
    pub start_time_utc: String,
    #[serde(rename = "easternUTCOffset")]
    pub eastern_utc_offset: String,
    #[serde(rename = "venueUTCOffset")]
    pub venue_utc_offset: String,
    pub game_state: String,
    pub game_schedule_state: String,
    pub display_period: i32,
    pub max_periods: i32,
    pub shootout_in_use: bool,
    pub ot_in_use: bool,
    pub reg_periods: i32,
    pub away_team: GameTeam,
    pub home_team: GameTeam,
    #[serde(default)]
    pub plays: Vec<Play>,
    #[serde(default)]
    pub roster_spots: Vec<RosterSpot>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameTeam {
    pub id: i64,
    pub name: LocalizedName,
    pub abbrev: String,
    pub logo: Option<String>,
    pub place_name: Option<LocalizedName>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodDescriptor {
    pub number: i32,
    pub period_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Play {
    pub event_id: i64,
    pub period_descriptor: PeriodDescriptor,
    pub time_in_period: String,
    pub time_remaining: String,
    pub situation_code: Option<String>,
    pub home_team_defending_side: Option<String>,
    pub type_code: i32,
    pub type_desc_key: String,
    pub sort_order: i64,
    /// Free-form event payload; shape varies by event type (shot, goal, hit,
    /// penalty, faceoff, ...). Persisted verbatim as JSONB.
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSpot {
    pub team_id: i64,
    pub player_id: i64,
    pub first_name: LocalizedName,
    pub last_name: LocalizedName,
    pub sweater_number: Option<i32>,
    pub position_code: String,
    pub headshot: Option<String>,
}

// ---------- player landing profile ----------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerLanding {
    pub player_id: i64,
    pub first_name: LocalizedName,
    pub last_name: LocalizedName,
    pub position: Option<String>,
    pub height_in_inches: Option<i32>,
    pub height_in_centimeters: Option<i32>,
    pub weight_in_pounds: Option<i32>,
    pub weight_in_kilograms: Option<i32>,
    pub birth_date: Option<String>,
    pub birth_city: Option<LocalizedName>,
    pub birth_state_province: Option<LocalizedName>,
    pub birth_country: Option<String>,
    pub shoots_catches: Option<String>,
    /// Nested draft object persisted as serialized JSON text.
    pub draft_details: Option<serde_json::Value>,
    pub headshot: Option<String>,
    pub hero_image: Option<String>,
    #[serde(default)]
    pub season_totals: Vec<SeasonTotal>,
}

/// One season line from the landing profile. The same season can be reported
/// several times (one row per league/sequence), so callers deduplicate by
/// `season` and restrict to the top-level league before fetching game logs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonTotal {
    pub season: i64,
    pub game_type_id: i32,
    pub league_abbrev: String,
}

// ---------- per-season game log ----------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameLogResponse {
    pub season_id: i64,
    #[serde(default)]
    pub game_log: Vec<GameLogRow>,
}

/// A player's statistical line for one game. The upstream document is
/// polymorphic (skater vs goalie) without a discriminant, so every
/// variant-specific field is optional here; dispatch happens at ingestion
/// time (see `ingest::encode::GameLogKind`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameLogRow {
    pub game_id: i64,
    pub team_abbrev: String,
    pub home_road_flag: Option<String>,
    pub game_date: Option<String>,
    pub opponent_abbrev: Option<String>,
    pub goals: Option<i32>,
    pub assists: Option<i32>,
    pub points: Option<i32>,
    pub plus_minus: Option<i32>,
    pub power_play_goals: Option<i32>,
    pub power_play_points: Option<i32>,
    pub game_winning_goals: Option<i32>,
    pub ot_goals: Option<i32>,
    pub shots: Option<i32>,
    pub shifts: Option<i32>,
    pub shorthanded_goals: Option<i32>,
    pub shorthanded_points: Option<i32>,
    pub games_started: Option<i32>,
    pub decision: Option<String>,
    pub shots_against: Option<i32>,
    pub goals_against: Option<i32>,
    pub save_pctg: Option<f64>,
    pub shutouts: Option<i32>,
    pub pim: Option<i32>,
    pub toi: Option<String>,
}

impl GameLogRow {
    /// Structural fallback when no position code was observed for the player:
    /// goalie lines carry the goalie-only quartet.
    pub fn looks_like_goalie(&self) -> bool {
        self.games_started.is_some()
            && self.shots_against.is_some()
            && self.goals_against.is_some()
            && self.shutouts.is_some()
    }
}
