//! Per-entity-type buffers of pending insert tuples plus the in-process
//! identity sets that make `add_if_absent` idempotent within a run.
//!
//! The identity sets are the sole mechanism preventing duplicate-key
//! violations at the sink: the traversal naturally revisits the same
//! team/person/game many times (a team appears in every one of its games'
//! documents), so every keyed append consults the set first. Resetting a
//! batch after a flush never clears its identity set; a game id seen once is
//! never reprocessed within the run.

use std::collections::{HashMap, HashSet};

/// Entity types the pipeline accumulates. Each carries its insert-statement
/// prefix (table + positional column list the encoders match).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Game,
    Team,
    Season,
    Person,
    PersonPosition,
    RosterSpot,
    Play,
    SkaterLog,
    GoalieLog,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        EntityKind::Game,
        EntityKind::Team,
        EntityKind::Season,
        EntityKind::Person,
        EntityKind::PersonPosition,
        EntityKind::RosterSpot,
        EntityKind::Play,
        EntityKind::SkaterLog,
        EntityKind::GoalieLog,
    ];

    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Game => "game",
            EntityKind::Team => "team",
            EntityKind::Season => "season",
            EntityKind::Person => "person",
            EntityKind::PersonPosition => "person_position",
            EntityKind::RosterSpot => "roster_spot",
            EntityKind::Play => "play",
            EntityKind::SkaterLog => "skater_game_log",
            EntityKind::GoalieLog => "goalie_game_log",
        }
    }

    fn statement_prefix(self) -> &'static str {
        match self {
            EntityKind::Game => {
                "INSERT INTO game (id, season, game_type, limited_scoring, game_date, venue, \
                 venue_location, start_time_utc, eastern_utc_offset, venue_utc_offset, \
                 game_state, game_schedule_state, display_period, max_periods, \
                 shootout_in_use, ot_in_use, reg_periods) VALUES "
            }
            EntityKind::Team => "INSERT INTO team (id, name, abbrev, logo, place_name) VALUES ",
            EntityKind::Season => "INSERT INTO season (id) VALUES ",
            EntityKind::Person => {
                "INSERT INTO person (id, first_name, last_name, position, height_in_inches, \
                 height_in_centimeters, weight_in_pounds, weight_in_kilograms, birth_date, \
                 birth_city, birth_state_province, birth_country, shoots_catches, \
                 draft_details, headshot, hero_image) VALUES "
            }
            EntityKind::PersonPosition => {
                "INSERT INTO person_position (person_id, position_code, season_id) VALUES "
            }
            EntityKind::RosterSpot => {
                "INSERT INTO roster_spot (team_id, player_id, game_id, first_name, last_name, \
                 sweater_number, position_code, headshot) VALUES "
            }
            EntityKind::Play => {
                "INSERT INTO play (event_id, game_id, period_number, period_type, \
                 time_in_period, time_remaining, situation_code, home_team_defending_side, \
                 type_code, type_desc_key, sort_order, details) VALUES "
            }
            EntityKind::SkaterLog => {
                "INSERT INTO skater_game_log (player_id, game_id, season, team_abbrev, \
                 home_road_flag, game_date, opponent_abbrev, goals, assists, points, \
                 plus_minus, power_play_goals, power_play_points, game_winning_goals, \
                 ot_goals, shots, shifts, shorthanded_goals, shorthanded_points, pim, toi) \
                 VALUES "
            }
            EntityKind::GoalieLog => {
                "INSERT INTO goalie_game_log (player_id, game_id, season, team_abbrev, \
                 home_road_flag, game_date, opponent_abbrev, games_started, decision, \
                 shots_against, goals_against, save_pctg, shutouts, goals, assists, pim, toi) \
                 VALUES "
            }
        }
    }
}

#[derive(Default)]
struct Batch {
    rows: Vec<String>,
    seen: HashSet<String>,
}

/// Owns one pending-tuple sequence and one identity set per entity type.
/// Constructed per run and passed through the loader; never a global.
pub struct QueryAccumulator {
    batches: HashMap<EntityKind, Batch>,
}

impl Default for QueryAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryAccumulator {
    pub fn new() -> Self {
        let mut batches = HashMap::with_capacity(EntityKind::ALL.len());
        for kind in EntityKind::ALL {
            batches.insert(kind, Batch::default());
        }
        Self { batches }
    }

    fn batch_mut(&mut self, kind: EntityKind) -> &mut Batch {
        self.batches.get_mut(&kind).expect("all kinds preallocated")
    }

    fn batch(&self, kind: EntityKind) -> &Batch {
        self.batches.get(&kind).expect("all kinds preallocated")
    }

    /// Append `tuple` unless `key` was already seen for this entity type.
    /// The key wins, not the content: a second call with the same key is a
    /// no-op even if its tuple differs.
    pub fn add_if_absent(&mut self, kind: EntityKind, key: &str, tuple: String) {
        let batch = self.batch_mut(kind);
        if batch.seen.contains(key) {
            return;
        }
        batch.seen.insert(key.to_string());
        batch.rows.push(tuple);
    }

    /// Append without dedup, for rows whose natural-key uniqueness is the
    /// sink's concern (plays, roster spots, game-log lines).
    pub fn add(&mut self, kind: EntityKind, tuple: String) {
        self.batch_mut(kind).rows.push(tuple);
    }

    /// Full batched insert statement for the pending rows, or `None` when
    /// nothing is pending (an empty batch must never reach the sink as a
    /// statement with a dangling VALUES clause).
    pub fn build_insert_statement(&self, kind: EntityKind) -> Option<String> {
        let batch = self.batch(kind);
        if batch.rows.is_empty() {
            return None;
        }
        Some(format!(
            "{}{}",
            kind.statement_prefix(),
            batch.rows.join(",\n")
        ))
    }

    /// Clear the pending rows only. The identity set survives: an entity
    /// flushed in an earlier checkpoint must not be re-accumulated later in
    /// the same run.
    pub fn reset(&mut self, kind: EntityKind) {
        self.batch_mut(kind).rows.clear();
    }

    pub fn pending_len(&self, kind: EntityKind) -> usize {
        self.batch(kind).rows.len()
    }

    pub fn seen(&self, kind: EntityKind, key: &str) -> bool {
        self.batch(kind).seen.contains(key)
    }
}
