//! Fixed DDL executed once at run start, plus the derived materialized views
//! (re)created after base tables are populated.
//!
//! Base tables are dropped and recreated each run: the pipeline is a full
//! backfill, and the on-disk fetch cache makes a re-run cheap.

/// Base-table DDL, in dependency order. A failure here is fatal to the run.
pub const SETUP_STATEMENTS: &[&str] = &[
    "DROP MATERIALIZED VIEW IF EXISTS skater_predictor",
    "DROP MATERIALIZED VIEW IF EXISTS weekly_fantasy_points",
    "DROP MATERIALIZED VIEW IF EXISTS season_fantasy_points",
    "DROP MATERIALIZED VIEW IF EXISTS skater_week_stats",
    "DROP MATERIALIZED VIEW IF EXISTS skater_season_stats",
    "DROP MATERIALIZED VIEW IF EXISTS play_type_catalog",
    "DROP TABLE IF EXISTS play CASCADE",
    "DROP TABLE IF EXISTS roster_spot CASCADE",
    "DROP TABLE IF EXISTS skater_game_log CASCADE",
    "DROP TABLE IF EXISTS goalie_game_log CASCADE",
    "DROP TABLE IF EXISTS person_position CASCADE",
    "DROP TABLE IF EXISTS position_code CASCADE",
    "DROP TABLE IF EXISTS person CASCADE",
    "DROP TABLE IF EXISTS game CASCADE",
    "DROP TABLE IF EXISTS team CASCADE",
    "DROP TABLE IF EXISTS season CASCADE",
    "CREATE TABLE season (
        id BIGINT PRIMARY KEY
    )",
    "CREATE TABLE team (
        id BIGINT PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        abbrev VARCHAR(10) NOT NULL,
        logo VARCHAR(255),
        place_name VARCHAR(255)
    )",
    "CREATE TABLE game (
        id BIGINT PRIMARY KEY,
        season BIGINT NOT NULL,
        game_type INT NOT NULL,
        limited_scoring BOOLEAN NOT NULL,
        game_date TIMESTAMP NOT NULL,
        venue VARCHAR(255) NOT NULL,
        venue_location VARCHAR(255) NOT NULL,
        start_time_utc TIMESTAMP NOT NULL,
        eastern_utc_offset VARCHAR(10) NOT NULL,
        venue_utc_offset VARCHAR(10) NOT NULL,
        game_state VARCHAR(50) NOT NULL,
        game_schedule_state VARCHAR(50) NOT NULL,
        display_period INT NOT NULL,
        max_periods INT NOT NULL,
        shootout_in_use BOOLEAN NOT NULL,
        ot_in_use BOOLEAN NOT NULL,
        reg_periods INT NOT NULL
    )",
    "CREATE TABLE person (
        id BIGINT PRIMARY KEY,
        first_name VARCHAR(100) NOT NULL,
        last_name VARCHAR(100) NOT NULL,
        position VARCHAR(2),
        height_in_inches INT,
        height_in_centimeters INT,
        weight_in_pounds INT,
        weight_in_kilograms INT,
        birth_date DATE,
        birth_city VARCHAR(100),
        birth_state_province VARCHAR(100),
        birth_country VARCHAR(10),
        shoots_catches VARCHAR(2),
        draft_details JSONB,
        headshot VARCHAR(255),
        hero_image VARCHAR(255)
    )",
    "CREATE TABLE position_code (
        code VARCHAR(1) PRIMARY KEY
    )",
    "INSERT INTO position_code (code) VALUES ('C'), ('D'), ('G'), ('L'), ('R')",
    "CREATE TABLE person_position (
        person_id BIGINT NOT NULL,
        position_code VARCHAR(1) NOT NULL REFERENCES position_code (code),
        season_id BIGINT NOT NULL,
        PRIMARY KEY (person_id, position_code, season_id)
    )",
    // Plays and roster spots reference the game row only: their batches flush
    // at the season checkpoint, before the end-of-run team/person flush, so a
    // hard FK to those tables would invert the flush ordering.
    "CREATE TABLE play (
        event_id BIGINT NOT NULL,
        game_id BIGINT NOT NULL REFERENCES game (id),
        period_number INT NOT NULL,
        period_type VARCHAR(10) NOT NULL,
        time_in_period VARCHAR(10) NOT NULL,
        time_remaining VARCHAR(10) NOT NULL,
        situation_code VARCHAR(50),
        home_team_defending_side VARCHAR(10),
        type_code INT NOT NULL,
        type_desc_key VARCHAR(50) NOT NULL,
        sort_order BIGINT NOT NULL,
        details JSONB,
        PRIMARY KEY (game_id, event_id)
    )",
    "CREATE TABLE roster_spot (
        team_id BIGINT NOT NULL,
        player_id BIGINT NOT NULL,
        game_id BIGINT NOT NULL REFERENCES game (id),
        first_name VARCHAR(255) NOT NULL,
        last_name VARCHAR(255) NOT NULL,
        sweater_number INT,
        position_code VARCHAR(2) NOT NULL,
        headshot VARCHAR(255),
        PRIMARY KEY (team_id, player_id, game_id)
    )",
    "CREATE TABLE skater_game_log (
        player_id BIGINT NOT NULL,
        game_id BIGINT NOT NULL,
        season BIGINT NOT NULL,
        team_abbrev VARCHAR(10) NOT NULL,
        home_road_flag VARCHAR(1),
        game_date DATE,
        opponent_abbrev VARCHAR(10),
        goals INT,
        assists INT,
        points INT,
        plus_minus INT,
        power_play_goals INT,
        power_play_points INT,
        game_winning_goals INT,
        ot_goals INT,
        shots INT,
        shifts INT,
        shorthanded_goals INT,
        shorthanded_points INT,
        pim INT,
        toi VARCHAR(10),
        PRIMARY KEY (player_id, game_id)
    )",
    "CREATE TABLE goalie_game_log (
        player_id BIGINT NOT NULL,
        game_id BIGINT NOT NULL,
        season BIGINT NOT NULL,
        team_abbrev VARCHAR(10) NOT NULL,
        home_road_flag VARCHAR(1),
        game_date DATE,
        opponent_abbrev VARCHAR(10),
        games_started INT,
        decision VARCHAR(1),
        shots_against INT,
        goals_against INT,
        save_pctg DOUBLE PRECISION,
        shutouts INT,
        goals INT,
        assists INT,
        pim INT,
        toi VARCHAR(10),
        PRIMARY KEY (player_id, game_id)
    )",
];

/// Derived-view DDL, run unconditionally at the end of a run. The views
/// tolerate partially populated base tables (they degrade to smaller
/// aggregates, not errors), so the refresh runs even after flush failures.
pub const VIEW_STATEMENTS: &[&str] = &[
    "DROP MATERIALIZED VIEW IF EXISTS skater_predictor",
    "DROP MATERIALIZED VIEW IF EXISTS weekly_fantasy_points",
    "DROP MATERIALIZED VIEW IF EXISTS season_fantasy_points",
    "DROP MATERIALIZED VIEW IF EXISTS skater_week_stats",
    "DROP MATERIALIZED VIEW IF EXISTS skater_season_stats",
    "DROP MATERIALIZED VIEW IF EXISTS play_type_catalog",
    "CREATE MATERIALIZED VIEW play_type_catalog AS
        SELECT DISTINCT type_code, type_desc_key
        FROM play
        ORDER BY type_code",
    // Per-player season counting stats derived from play events. Assists and
    // shots fan out from the goal/shot details payloads.
    "CREATE MATERIALIZED VIEW skater_season_stats AS
        SELECT g.season, ev.player_id,
               COUNT(*) FILTER (WHERE ev.stat = 'goal')   AS goals,
               COUNT(*) FILTER (WHERE ev.stat = 'assist') AS assists,
               COUNT(*) FILTER (WHERE ev.stat = 'shot')   AS shots,
               COUNT(*) FILTER (WHERE ev.stat = 'hit')    AS hits,
               COUNT(*) FILTER (WHERE ev.stat = 'block')  AS blocks
        FROM (
            SELECT game_id, (details ->> 'scoringPlayerId')::bigint AS player_id, 'goal' AS stat
            FROM play WHERE type_desc_key = 'goal' AND details ? 'scoringPlayerId'
            UNION ALL
            SELECT game_id, (details ->> 'assist1PlayerId')::bigint, 'assist'
            FROM play WHERE type_desc_key = 'goal' AND details ? 'assist1PlayerId'
            UNION ALL
            SELECT game_id, (details ->> 'assist2PlayerId')::bigint, 'assist'
            FROM play WHERE type_desc_key = 'goal' AND details ? 'assist2PlayerId'
            UNION ALL
            SELECT game_id, (details ->> 'shootingPlayerId')::bigint, 'shot'
            FROM play WHERE type_desc_key IN ('shot-on-goal', 'goal') AND details ? 'shootingPlayerId'
            UNION ALL
            SELECT game_id, (details ->> 'hittingPlayerId')::bigint, 'hit'
            FROM play WHERE type_desc_key = 'hit' AND details ? 'hittingPlayerId'
            UNION ALL
            SELECT game_id, (details ->> 'blockingPlayerId')::bigint, 'block'
            FROM play WHERE type_desc_key = 'blocked-shot' AND details ? 'blockingPlayerId'
        ) ev
        JOIN game g ON g.id = ev.game_id
        WHERE ev.player_id IS NOT NULL
        GROUP BY g.season, ev.player_id",
    "CREATE MATERIALIZED VIEW skater_week_stats AS
        SELECT g.season, date_trunc('week', g.game_date) AS week_start, ev.player_id,
               COUNT(*) FILTER (WHERE ev.stat = 'goal')   AS goals,
               COUNT(*) FILTER (WHERE ev.stat = 'assist') AS assists,
               COUNT(*) FILTER (WHERE ev.stat = 'shot')   AS shots,
               COUNT(*) FILTER (WHERE ev.stat = 'hit')    AS hits,
               COUNT(*) FILTER (WHERE ev.stat = 'block')  AS blocks
        FROM (
            SELECT game_id, (details ->> 'scoringPlayerId')::bigint AS player_id, 'goal' AS stat
            FROM play WHERE type_desc_key = 'goal' AND details ? 'scoringPlayerId'
            UNION ALL
            SELECT game_id, (details ->> 'assist1PlayerId')::bigint, 'assist'
            FROM play WHERE type_desc_key = 'goal' AND details ? 'assist1PlayerId'
            UNION ALL
            SELECT game_id, (details ->> 'assist2PlayerId')::bigint, 'assist'
            FROM play WHERE type_desc_key = 'goal' AND details ? 'assist2PlayerId'
            UNION ALL
            SELECT game_id, (details ->> 'shootingPlayerId')::bigint, 'shot'
            FROM play WHERE type_desc_key IN ('shot-on-goal', 'goal') AND details ? 'shootingPlayerId'
            UNION ALL
            SELECT game_id, (details ->> 'hittingPlayerId')::bigint, 'hit'
            FROM play WHERE type_desc_key = 'hit' AND details ? 'hittingPlayerId'
            UNION ALL
            SELECT game_id, (details ->> 'blockingPlayerId')::bigint, 'block'
            FROM play WHERE type_desc_key = 'blocked-shot' AND details ? 'blockingPlayerId'
        ) ev
        JOIN game g ON g.id = ev.game_id
        WHERE ev.player_id IS NOT NULL
        GROUP BY g.season, date_trunc('week', g.game_date), ev.player_id",
    // Standard points-league scoring over the season aggregates.
    "CREATE MATERIALIZED VIEW season_fantasy_points AS
        SELECT season, player_id,
               goals * 3.0
             + assists * 2.0
             + shots * 0.4
             + hits * 0.5
             + blocks * 0.5 AS fantasy_points
        FROM skater_season_stats",
    "CREATE MATERIALIZED VIEW weekly_fantasy_points AS
        SELECT season, week_start, player_id,
               goals * 3.0
             + assists * 2.0
             + shots * 0.4
             + hits * 0.5
             + blocks * 0.5 AS fantasy_points
        FROM skater_week_stats",
    // Current season joined with the prior season (packed ids differ by
    // 10001: 20232024 -> 20222023) for projection inputs.
    "CREATE MATERIALIZED VIEW skater_predictor AS
        SELECT cur.player_id, cur.season,
               cur.fantasy_points,
               prior.fantasy_points AS prior_fantasy_points,
               s.goals, s.assists, s.shots, s.hits, s.blocks
        FROM season_fantasy_points cur
        JOIN skater_season_stats s
          ON s.player_id = cur.player_id AND s.season = cur.season
        LEFT JOIN season_fantasy_points prior
          ON prior.player_id = cur.player_id AND prior.season = cur.season - 10001",
];
