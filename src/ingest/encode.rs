//! Pure mappings from fetched domain objects to positional SQL tuple
//! strings. Column order matches the statement prefixes in
//! `accumulator::EntityKind` exactly.
//!
//! Text is escaped by doubling embedded single quotes; absent optional
//! fields emit SQL NULL uniformly. Nested structures (play details, draft
//! details) are serialized to canonical JSON and embedded as quoted
//! literals.

use std::fmt::Display;

use anyhow::{Context, Result};

use crate::api::types::{GameLogRow, GameTeam, Play, PlayByPlay, PlayerLanding, RosterSpot};

/// Which game-log table a row belongs to. Decided once at ingestion time
/// from the position code recorded for the player; the structural predicate
/// on the row shape is a fallback only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameLogKind {
    Skater,
    Goalie,
}

impl GameLogKind {
    pub fn for_player(position_code: Option<&str>, row: &GameLogRow) -> Self {
        match position_code {
            Some("G") => GameLogKind::Goalie,
            Some(_) => GameLogKind::Skater,
            None if row.looks_like_goalie() => GameLogKind::Goalie,
            None => GameLogKind::Skater,
        }
    }
}

fn quoted(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn opt_quoted(v: Option<&str>) -> String {
    v.map(quoted).unwrap_or_else(|| "NULL".to_string())
}

fn opt_num<T: Display>(v: Option<T>) -> String {
    v.map(|n| n.to_string()).unwrap_or_else(|| "NULL".to_string())
}

fn bool_lit(b: bool) -> &'static str {
    if b {
        "TRUE"
    } else {
        "FALSE"
    }
}

fn json_literal(v: &serde_json::Value) -> Result<String> {
    let raw = serde_json::to_string(v).context("serializing embedded JSON field")?;
    Ok(quoted(&raw))
}

fn opt_json(v: Option<&serde_json::Value>) -> Result<String> {
    match v {
        Some(v) => json_literal(v),
        None => Ok("NULL".to_string()),
    }
}

pub fn game_tuple(doc: &PlayByPlay) -> String {
    format!(
        "({}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {})",
        doc.id,
        doc.season,
        doc.game_type,
        bool_lit(doc.limited_scoring),
        quoted(&doc.game_date),
        quoted(&doc.venue.default),
        quoted(&doc.venue_location.default),
        quoted(&doc.start_time_utc),
        quoted(&doc.eastern_utc_offset),
        quoted(&doc.venue_utc_offset),
        quoted(&doc.game_state),
        quoted(&doc.game_schedule_state),
        doc.display_period,
        doc.max_periods,
        bool_lit(doc.shootout_in_use),
        bool_lit(doc.ot_in_use),
        doc.reg_periods,
    )
}

pub fn team_tuple(team: &GameTeam) -> String {
    format!(
        "({}, {}, {}, {}, {})",
        team.id,
        quoted(&team.name.default),
        quoted(&team.abbrev),
        opt_quoted(team.logo.as_deref()),
        opt_quoted(team.place_name.as_ref().map(|n| n.default.as_str())),
    )
}

pub fn season_tuple(season: i64) -> String {
    format!("({season})")
}

pub fn person_tuple(profile: &PlayerLanding) -> Result<String> {
    Ok(format!(
        "({}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {})",
        profile.player_id,
        quoted(&profile.first_name.default),
        quoted(&profile.last_name.default),
        opt_quoted(profile.position.as_deref()),
        opt_num(profile.height_in_inches),
        opt_num(profile.height_in_centimeters),
        opt_num(profile.weight_in_pounds),
        opt_num(profile.weight_in_kilograms),
        opt_quoted(profile.birth_date.as_deref()),
        opt_quoted(profile.birth_city.as_ref().map(|n| n.default.as_str())),
        opt_quoted(
            profile
                .birth_state_province
                .as_ref()
                .map(|n| n.default.as_str())
        ),
        opt_quoted(profile.birth_country.as_deref()),
        opt_quoted(profile.shoots_catches.as_deref()),
        opt_json(profile.draft_details.as_ref())?,
        opt_quoted(profile.headshot.as_deref()),
        opt_quoted(profile.hero_image.as_deref()),
    ))
}

/// Fallback person row when the landing profile is absent: identity and
/// name from the roster spot, every bio column NULL.
pub fn person_tuple_minimal(
    player_id: i64,
    first_name: &str,
    last_name: &str,
    position_code: Option<&str>,
) -> String {
    format!(
        "({}, {}, {}, {}, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL)",
        player_id,
        quoted(first_name),
        quoted(last_name),
        opt_quoted(position_code),
    )
}

pub fn person_position_tuple(player_id: i64, position_code: &str, season: i64) -> String {
    format!("({}, {}, {})", player_id, quoted(position_code), season)
}

pub fn roster_spot_tuple(game_id: i64, spot: &RosterSpot) -> String {
    format!(
        "({}, {}, {}, {}, {}, {}, {}, {})",
        spot.team_id,
        spot.player_id,
        game_id,
        quoted(&spot.first_name.default),
        quoted(&spot.last_name.default),
        opt_num(spot.sweater_number),
        quoted(&spot.position_code),
        opt_quoted(spot.headshot.as_deref()),
    )
}

pub fn play_tuple(game_id: i64, play: &Play) -> Result<String> {
    Ok(format!(
        "({}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {})",
        play.event_id,
        game_id,
        play.period_descriptor.number,
        quoted(&play.period_descriptor.period_type),
        quoted(&play.time_in_period),
        quoted(&play.time_remaining),
        opt_quoted(play.situation_code.as_deref()),
        opt_quoted(play.home_team_defending_side.as_deref()),
        play.type_code,
        quoted(&play.type_desc_key),
        play.sort_order,
        opt_json(play.details.as_ref())?,
    ))
}

pub fn skater_log_tuple(player_id: i64, season: i64, row: &GameLogRow) -> String {
    format!(
        "({}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {})",
        player_id,
        row.game_id,
        season,
        quoted(&row.team_abbrev),
        opt_quoted(row.home_road_flag.as_deref()),
        opt_quoted(row.game_date.as_deref()),
        opt_quoted(row.opponent_abbrev.as_deref()),
        opt_num(row.goals),
        opt_num(row.assists),
        opt_num(row.points),
        opt_num(row.plus_minus),
        opt_num(row.power_play_goals),
        opt_num(row.power_play_points),
        opt_num(row.game_winning_goals),
        opt_num(row.ot_goals),
        opt_num(row.shots),
        opt_num(row.shifts),
        opt_num(row.shorthanded_goals),
        opt_num(row.shorthanded_points),
        opt_num(row.pim),
        opt_quoted(row.toi.as_deref()),
    )
}

pub fn goalie_log_tuple(player_id: i64, season: i64, row: &GameLogRow) -> String {
    format!(
        "({}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {})",
        player_id,
        row.game_id,
        season,
        quoted(&row.team_abbrev),
        opt_quoted(row.home_road_flag.as_deref()),
        opt_quoted(row.game_date.as_deref()),
        opt_quoted(row.opponent_abbrev.as_deref()),
        opt_num(row.games_started),
        opt_quoted(row.decision.as_deref()),
        opt_num(row.shots_against),
        opt_num(row.goals_against),
        opt_num(row.save_pctg),
        opt_num(row.shutouts),
        opt_num(row.goals),
        opt_num(row.assists),
        opt_num(row.pim),
        opt_quoted(row.toi.as_deref()),
    )
}
