//! Drives the full season → team → schedule → game traversal and owns the
//! flush/checkpoint policy.
//!
//! Play-by-play fetches fan out through a bounded window, but the resulting
//! documents are consumed by this single task, which alone mutates the
//! accumulator; the check-then-append sequence therefore never races.
//!
//! Flush policy: game/play/roster-spot batches flush at the end of each
//! season (bounding memory across a run that can span 15+ seasons), then
//! reset. Team/season/person/position and game-log batches accumulate across
//! the whole run and flush once at the end. Every flush is isolated per
//! entity type: a failure writes a dead-letter record and the run continues.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};

use crate::api::types::PlayByPlay;
use crate::api::Fetch;
use crate::db::{schema, Sink};
use crate::season::SeasonId;
use crate::REGULAR_SEASON;

use super::accumulator::{EntityKind, QueryAccumulator};
use super::deadletter::DeadLetter;
use super::encode::{self, GameLogKind};

/// Batches flushed at every season checkpoint, in dependency order (plays
/// and roster spots reference the game row).
const SEASON_CHECKPOINT_KINDS: [EntityKind; 3] =
    [EntityKind::Game, EntityKind::Play, EntityKind::RosterSpot];

/// Batches that accumulate across the whole run and flush once at the end.
const FINAL_KINDS: [EntityKind; 6] = [
    EntityKind::Team,
    EntityKind::Season,
    EntityKind::Person,
    EntityKind::PersonPosition,
    EntityKind::SkaterLog,
    EntityKind::GoalieLog,
];

/// Name and position observed for a player via roster spots during the main
/// loop. Drives game-log dispatch and the fallback person row when the
/// landing profile is absent.
struct DiscoveredPlayer {
    first_name: String,
    last_name: String,
    position_code: String,
}

pub struct BatchLoader<F, S> {
    fetch: F,
    sink: S,
    acc: QueryAccumulator,
    dead_letters: DeadLetter,
    fanout: usize,
    /// Run-scoped game-id set: a game appears in both participating teams'
    /// schedules and must be fetched and encoded once.
    seen_games: HashSet<i64>,
    discovered: HashMap<i64, DiscoveredPlayer>,
}

impl<F: Fetch, S: Sink> BatchLoader<F, S> {
    pub fn new(fetch: F, sink: S, dead_letters: DeadLetter, fanout: usize) -> Self {
        Self {
            fetch,
            sink,
            acc: QueryAccumulator::new(),
            dead_letters,
            fanout: fanout.max(1),
            seen_games: HashSet::new(),
            discovered: HashMap::new(),
        }
    }

    /// Run the whole pipeline. Only schema setup is fatal; every other fault
    /// is logged (and dead-lettered where applicable) and the run continues.
    pub async fn run(&mut self, seasons: &[SeasonId], refresh_views: bool) -> Result<()> {
        self.setup_schema().await?;
        for &season in seasons {
            self.load_season(season).await;
        }
        self.load_player_profiles().await;
        self.flush_final().await;
        if refresh_views {
            self.refresh_views().await;
        }
        Ok(())
    }

    /// Base-table DDL; a failure here aborts the run since no subsequent
    /// write can succeed without the schema.
    async fn setup_schema(&self) -> Result<()> {
        for stmt in schema::SETUP_STATEMENTS {
            self.sink
                .execute(stmt)
                .await
                .context("schema setup failed")?;
        }
        info!("schema ready");
        Ok(())
    }

    async fn load_season(&mut self, season: SeasonId) {
        info!(%season, "loading season");
        let Some(teams) = self.fetch.teams().await else {
            warn!(%season, "team list absent; skipping season");
            return;
        };

        // Collect the season's regular-season game ids across all teams
        // before any play-by-play fetch: a game surfaces in both the home
        // and away schedules.
        let mut game_ids: Vec<i64> = Vec::new();
        for team in &teams.data {
            let Some(schedule) = self.fetch.team_schedule(&team.tri_code, season).await else {
                warn!(%season, tri_code = %team.tri_code, "schedule absent; skipping team");
                continue;
            };
            for game in &schedule.games {
                if game.game_type != REGULAR_SEASON {
                    continue;
                }
                if self.seen_games.insert(game.id) {
                    game_ids.push(game.id);
                }
            }
        }
        info!(%season, games = game_ids.len(), "collected game ids");

        {
            let fanout = self.fanout;
            let Self {
                fetch,
                acc,
                discovered,
                ..
            } = self;
            let fetch: &F = fetch;
            let mut docs = stream::iter(game_ids.into_iter().map(|game_id| async move {
                (game_id, fetch.play_by_play(game_id).await)
            }))
            .buffer_unordered(fanout);

            while let Some((game_id, doc)) = docs.next().await {
                match doc {
                    Some(doc) => Self::process_game(acc, discovered, &doc),
                    None => warn!(game_id, "play-by-play absent; skipping game"),
                }
            }
        }

        let checkpoint = season.to_string();
        for kind in SEASON_CHECKPOINT_KINDS {
            self.flush(kind, &checkpoint).await;
        }
        info!(%season, "season checkpoint flushed");
    }

    /// Decompose one play-by-play document into its sub-entities, in
    /// dependency order: game, teams, season, person positions, plays,
    /// roster spots.
    fn process_game(
        acc: &mut QueryAccumulator,
        discovered: &mut HashMap<i64, DiscoveredPlayer>,
        doc: &PlayByPlay,
    ) {
        acc.add_if_absent(EntityKind::Game, &doc.id.to_string(), encode::game_tuple(doc));

        for team in [&doc.home_team, &doc.away_team] {
            acc.add_if_absent(
                EntityKind::Team,
                &team.id.to_string(),
                encode::team_tuple(team),
            );
        }

        acc.add_if_absent(
            EntityKind::Season,
            &doc.season.to_string(),
            encode::season_tuple(doc.season),
        );

        for spot in &doc.roster_spots {
            discovered
                .entry(spot.player_id)
                .or_insert_with(|| DiscoveredPlayer {
                    first_name: spot.first_name.default.clone(),
                    last_name: spot.last_name.default.clone(),
                    position_code: spot.position_code.clone(),
                });
            // Position tags are season-scoped: the same player can pick up a
            // new tag in a later season.
            let key = format!("{}:{}:{}", spot.player_id, spot.position_code, doc.season);
            acc.add_if_absent(
                EntityKind::PersonPosition,
                &key,
                encode::person_position_tuple(spot.player_id, &spot.position_code, doc.season),
            );
        }

        for play in &doc.plays {
            match encode::play_tuple(doc.id, play) {
                Ok(tuple) => acc.add(EntityKind::Play, tuple),
                Err(err) => warn!(
                    game_id = doc.id,
                    event_id = play.event_id,
                    error = %err,
                    "failed to encode play; skipping record"
                ),
            }
        }

        for spot in &doc.roster_spots {
            acc.add(EntityKind::RosterSpot, encode::roster_spot_tuple(doc.id, spot));
        }

        info!(game_id = doc.id, plays = doc.plays.len(), "game encoded");
    }

    /// Second pass: for every distinct person observed via roster spots,
    /// fetch the landing profile (person row) and each NHL regular season's
    /// game log. An absent profile degrades to a minimal person row and
    /// never affects other players.
    async fn load_player_profiles(&mut self) {
        let mut player_ids: Vec<i64> = self.discovered.keys().copied().collect();
        player_ids.sort_unstable();
        info!(players = player_ids.len(), "loading player profiles");

        for player_id in player_ids {
            let key = player_id.to_string();
            let Some(profile) = self.fetch.player_landing(player_id).await else {
                warn!(player_id, "player landing absent; writing minimal person row");
                let d = &self.discovered[&player_id];
                let tuple = encode::person_tuple_minimal(
                    player_id,
                    &d.first_name,
                    &d.last_name,
                    Some(&d.position_code),
                );
                self.acc.add_if_absent(EntityKind::Person, &key, tuple);
                continue;
            };

            match encode::person_tuple(&profile) {
                Ok(tuple) => self.acc.add_if_absent(EntityKind::Person, &key, tuple),
                Err(err) => {
                    warn!(player_id, error = %err, "failed to encode person; skipping record");
                }
            }

            let position_code = self
                .discovered
                .get(&player_id)
                .map(|d| d.position_code.clone())
                .or_else(|| profile.position.clone());

            // A season is reported once per league/sequence; restrict to
            // top-level-league regular seasons and fetch each season once.
            let mut fetched_seasons: HashSet<i64> = HashSet::new();
            for total in &profile.season_totals {
                if total.league_abbrev != "NHL" || total.game_type_id != REGULAR_SEASON {
                    continue;
                }
                if !fetched_seasons.insert(total.season) {
                    continue;
                }
                let Some(season) = SeasonId::from_packed(total.season) else {
                    warn!(player_id, season = total.season, "unparseable season id");
                    continue;
                };
                let Some(log) = self.fetch.player_game_log(player_id, season).await else {
                    warn!(player_id, %season, "game log absent; skipping season");
                    continue;
                };
                for row in &log.game_log {
                    match GameLogKind::for_player(position_code.as_deref(), row) {
                        GameLogKind::Goalie => self.acc.add(
                            EntityKind::GoalieLog,
                            encode::goalie_log_tuple(player_id, total.season, row),
                        ),
                        GameLogKind::Skater => self.acc.add(
                            EntityKind::SkaterLog,
                            encode::skater_log_tuple(player_id, total.season, row),
                        ),
                    }
                }
            }
        }
    }

    async fn flush_final(&mut self) {
        for kind in FINAL_KINDS {
            self.flush(kind, "final").await;
        }
        info!("final batches flushed");
    }

    /// Flush one entity type's pending batch. Failures are isolated: the
    /// statement is dead-lettered and the run continues. The batch is reset
    /// either way; the identity sets survive.
    async fn flush(&mut self, kind: EntityKind, checkpoint: &str) {
        let Some(stmt) = self.acc.build_insert_statement(kind) else {
            return;
        };
        let rows = self.acc.pending_len(kind);
        match self.sink.execute(&stmt).await {
            Ok(_) => info!(entity = kind.table(), checkpoint, rows, "batch flushed"),
            Err(err) => {
                error!(entity = kind.table(), checkpoint, rows, error = %err, "batch flush failed");
                match self.dead_letters.record(kind, checkpoint, &err, &stmt) {
                    Ok(path) => warn!(entity = kind.table(), path = %path.display(), "dead-letter record written"),
                    Err(dl_err) => {
                        error!(entity = kind.table(), error = %dl_err, "failed to write dead-letter record")
                    }
                }
            }
        }
        self.acc.reset(kind);
    }

    /// (Re)create the derived materialized views. Runs once per run,
    /// regardless of upstream flush failures: the views tolerate partially
    /// populated base tables.
    async fn refresh_views(&self) {
        info!("refreshing derived views");
        for stmt in schema::VIEW_STATEMENTS {
            if let Err(err) = self.sink.execute(stmt).await {
                warn!(error = %err, "view statement failed; continuing");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{
        GameLogResponse, PlayerLanding, ScheduleResponse, TeamsResponse,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    // ---------- fakes ----------

    /// Scripted fetcher: responses are stored as raw JSON and deserialized
    /// per call; every play-by-play request is recorded.
    #[derive(Default)]
    struct ScriptedFetch {
        teams: Option<serde_json::Value>,
        schedules: HashMap<(String, i64), serde_json::Value>,
        games: HashMap<i64, serde_json::Value>,
        landings: HashMap<i64, serde_json::Value>,
        game_logs: HashMap<(i64, i64), serde_json::Value>,
        pbp_calls: Mutex<Vec<i64>>,
    }

    #[async_trait]
    impl Fetch for ScriptedFetch {
        async fn teams(&self) -> Option<TeamsResponse> {
            let raw = self.teams.clone()?;
            serde_json::from_value(raw).ok()
        }

        async fn team_schedule(
            &self,
            tri_code: &str,
            season: SeasonId,
        ) -> Option<ScheduleResponse> {
            let raw = self
                .schedules
                .get(&(tri_code.to_string(), season.packed()))?
                .clone();
            serde_json::from_value(raw).ok()
        }

        async fn play_by_play(&self, game_id: i64) -> Option<PlayByPlay> {
            self.pbp_calls.lock().unwrap().push(game_id);
            let raw = self.games.get(&game_id)?.clone();
            serde_json::from_value(raw).ok()
        }

        async fn player_landing(&self, player_id: i64) -> Option<PlayerLanding> {
            let raw = self.landings.get(&player_id)?.clone();
            serde_json::from_value(raw).ok()
        }

        async fn player_game_log(
            &self,
            player_id: i64,
            season: SeasonId,
        ) -> Option<GameLogResponse> {
            let raw = self.game_logs.get(&(player_id, season.packed()))?.clone();
            serde_json::from_value(raw).ok()
        }
    }

    /// Records every executed statement; statements targeting a listed table
    /// fail instead.
    #[derive(Clone, Default)]
    struct RecordingSink {
        statements: Arc<Mutex<Vec<String>>>,
        fail_tables: Vec<&'static str>,
    }

    #[async_trait]
    impl Sink for RecordingSink {
        async fn execute(&self, sql: &str) -> Result<u64> {
            for table in &self.fail_tables {
                if sql.starts_with(&format!("INSERT INTO {table} (")) {
                    return Err(anyhow::anyhow!("simulated sink failure on {table}"));
                }
            }
            self.statements.lock().unwrap().push(sql.to_string());
            Ok(1)
        }
    }

    // ---------- fixture builders ----------

    fn teams_fixture() -> serde_json::Value {
        json!({
            "data": [
                {"id": 10, "fullName": "Toronto Maple Leafs", "triCode": "TOR"},
                {"id": 8, "fullName": "Montréal Canadiens", "triCode": "MTL"}
            ]
        })
    }

    fn schedule_fixture(games: &[(i64, i32)]) -> serde_json::Value {
        json!({
            "games": games
                .iter()
                .map(|(id, game_type)| json!({"id": id, "gameType": game_type}))
                .collect::<Vec<_>>()
        })
    }

    fn pbp_fixture(game_id: i64, season: i64) -> serde_json::Value {
        json!({
            "id": game_id,
            "season": season,
            "gameType": 2,
            "limitedScoring": false,
            "gameDate": "2023-11-09",
            "venue": {"default": "Scotiabank Arena"},
            "venueLocation": {"default": "Toronto"},
            "startTimeUTC": "2023-11-10T00:00:00Z",
            "easternUTCOffset": "-05:00",
            "venueUTCOffset": "-05:00",
            "gameState": "OFF",
            "gameScheduleState": "OK",
            "displayPeriod": 3,
            "maxPeriods": 5,
            "shootoutInUse": true,
            "otInUse": true,
            "regPeriods": 3,
            "awayTeam": {"id": 8, "name": {"default": "Canadiens"}, "abbrev": "MTL"},
            "homeTeam": {"id": 10, "name": {"default": "Maple Leafs"}, "abbrev": "TOR"},
            "plays": [
                {
                    "eventId": 101,
                    "periodDescriptor": {"number": 1, "periodType": "REG"},
                    "timeInPeriod": "00:00",
                    "timeRemaining": "20:00",
                    "typeCode": 520,
                    "typeDescKey": "period-start",
                    "sortOrder": 1
                },
                {
                    "eventId": 102,
                    "periodDescriptor": {"number": 1, "periodType": "REG"},
                    "timeInPeriod": "00:00",
                    "timeRemaining": "20:00",
                    "situationCode": "1551",
                    "typeCode": 502,
                    "typeDescKey": "faceoff",
                    "sortOrder": 2,
                    "details": {"winningPlayerId": 500, "losingPlayerId": 600}
                },
                {
                    "eventId": 103,
                    "periodDescriptor": {"number": 1, "periodType": "REG"},
                    "timeInPeriod": "04:21",
                    "timeRemaining": "15:39",
                    "situationCode": "1551",
                    "typeCode": 505,
                    "typeDescKey": "goal",
                    "sortOrder": 3,
                    "details": {"scoringPlayerId": 500, "shotType": "wrist"}
                }
            ],
            "rosterSpots": [
                {
                    "teamId": 10,
                    "playerId": 500,
                    "firstName": {"default": "Auston"},
                    "lastName": {"default": "Matthews"},
                    "sweaterNumber": 34,
                    "positionCode": "C"
                },
                {
                    "teamId": 8,
                    "playerId": 600,
                    "firstName": {"default": "Sam"},
                    "lastName": {"default": "Montembeault"},
                    "sweaterNumber": 35,
                    "positionCode": "G"
                }
            ]
        })
    }

    fn landing_fixture(player_id: i64, position: &str, season: i64) -> serde_json::Value {
        json!({
            "playerId": player_id,
            "firstName": {"default": "First"},
            "lastName": {"default": "Last"},
            "position": position,
            "heightInInches": 75,
            "weightInPounds": 208,
            "birthDate": "1997-09-17",
            "birthCountry": "USA",
            "shootsCatches": "L",
            "draftDetails": {"year": 2016, "round": 1, "overallPick": 1},
            "seasonTotals": [
                // Same season reported twice (AHL sequence + NHL), plus a
                // playoff line: only one NHL regular-season fetch results.
                {"season": season, "gameTypeId": 2, "leagueAbbrev": "AHL"},
                {"season": season, "gameTypeId": 2, "leagueAbbrev": "NHL"},
                {"season": season, "gameTypeId": 3, "leagueAbbrev": "NHL"}
            ]
        })
    }

    fn skater_log_fixture(game_id: i64) -> serde_json::Value {
        json!({
            "seasonId": 20232024i64,
            "gameLog": [{
                "gameId": game_id,
                "teamAbbrev": "TOR",
                "homeRoadFlag": "H",
                "gameDate": "2023-11-09",
                "goals": 2,
                "assists": 1,
                "points": 3,
                "shots": 6,
                "opponentAbbrev": "MTL"
            }]
        })
    }

    fn goalie_log_fixture(game_id: i64) -> serde_json::Value {
        json!({
            "seasonId": 20232024i64,
            "gameLog": [{
                "gameId": game_id,
                "teamAbbrev": "MTL",
                "homeRoadFlag": "R",
                "gameDate": "2023-11-09",
                "gamesStarted": 1,
                "decision": "L",
                "shotsAgainst": 33,
                "goalsAgainst": 3,
                "savePctg": 0.909,
                "shutouts": 0,
                "opponentAbbrev": "TOR"
            }]
        })
    }

    fn fixture_fetch() -> ScriptedFetch {
        let mut fetch = ScriptedFetch {
            teams: Some(teams_fixture()),
            ..Default::default()
        };
        // One shared regular-season game between the two clubs.
        fetch
            .schedules
            .insert(("TOR".into(), 20232024), schedule_fixture(&[(100, 2)]));
        fetch
            .schedules
            .insert(("MTL".into(), 20232024), schedule_fixture(&[(100, 2)]));
        fetch.games.insert(100, pbp_fixture(100, 20232024));
        fetch.landings.insert(500, landing_fixture(500, "C", 20232024));
        fetch.landings.insert(600, landing_fixture(600, "G", 20232024));
        fetch.game_logs.insert((500, 20232024), skater_log_fixture(100));
        fetch.game_logs.insert((600, 20232024), goalie_log_fixture(100));
        fetch
    }

    fn temp_dl_dir(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("puckload_test_{tag}_{}_{nanos}", std::process::id()))
    }

    /// Count tuples inserted into `table` across all recorded statements.
    fn row_count(statements: &[String], table: &str) -> usize {
        let prefix = format!("INSERT INTO {table} (");
        statements
            .iter()
            .filter(|s| s.starts_with(&prefix))
            .map(|s| s.matches("),\n(").count() + 1)
            .sum()
    }

    fn seasons() -> Vec<SeasonId> {
        vec![SeasonId::new(2023).unwrap()]
    }

    // ---------- scenarios ----------

    #[tokio::test]
    async fn end_to_end_fixture_counts() {
        let sink = RecordingSink::default();
        let dir = temp_dl_dir("e2e");
        let mut loader = BatchLoader::new(fixture_fetch(), sink.clone(), DeadLetter::new(&dir), 4);
        loader.run(&seasons(), true).await.unwrap();

        let stmts = sink.statements.lock().unwrap().clone();
        assert_eq!(row_count(&stmts, "season"), 1);
        assert_eq!(row_count(&stmts, "team"), 2);
        assert_eq!(row_count(&stmts, "game"), 1);
        assert_eq!(row_count(&stmts, "person"), 2);
        assert_eq!(row_count(&stmts, "person_position"), 2);
        assert_eq!(row_count(&stmts, "roster_spot"), 2);
        assert_eq!(row_count(&stmts, "play"), 3);
        assert_eq!(row_count(&stmts, "skater_game_log"), 1);
        assert_eq!(row_count(&stmts, "goalie_game_log"), 1);

        // View refresh ran exactly once at the end.
        let creates = stmts
            .iter()
            .filter(|s| s.starts_with("CREATE MATERIALIZED VIEW"))
            .count();
        assert_eq!(creates, 6);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn shared_game_is_fetched_once() {
        let fetch = fixture_fetch();
        let sink = RecordingSink::default();
        let dir = temp_dl_dir("dedup");
        let mut loader = BatchLoader::new(fetch, sink, DeadLetter::new(&dir), 4);
        loader.run(&seasons(), false).await.unwrap();

        let calls = loader.fetch.pbp_calls.lock().unwrap().clone();
        assert_eq!(calls, vec![100], "game 100 appears in both schedules");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn non_regular_season_games_never_fetched() {
        let mut fetch = fixture_fetch();
        // Preseason game 200 alongside the regular-season game 100.
        fetch.schedules.insert(
            ("TOR".into(), 20232024),
            schedule_fixture(&[(200, 1), (100, 2)]),
        );
        fetch.games.insert(200, pbp_fixture(200, 20232024));

        let sink = RecordingSink::default();
        let dir = temp_dl_dir("filter");
        let mut loader = BatchLoader::new(fetch, sink, DeadLetter::new(&dir), 4);
        loader.run(&seasons(), false).await.unwrap();

        let calls = loader.fetch.pbp_calls.lock().unwrap().clone();
        assert_eq!(calls, vec![100], "preseason game must not trigger a fetch");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn play_flush_failure_is_isolated() {
        let mut fetch = fixture_fetch();
        // A second season with its own game so the loop must survive the
        // first season's play failure.
        fetch
            .schedules
            .insert(("TOR".into(), 20242025), schedule_fixture(&[(300, 2)]));
        fetch
            .schedules
            .insert(("MTL".into(), 20242025), schedule_fixture(&[(300, 2)]));
        fetch.games.insert(300, pbp_fixture(300, 20242025));

        let sink = RecordingSink {
            fail_tables: vec!["play"],
            ..Default::default()
        };
        let dir = temp_dl_dir("isolation");
        let mut loader = BatchLoader::new(fetch, sink.clone(), DeadLetter::new(&dir), 4);
        let two_seasons = vec![SeasonId::new(2023).unwrap(), SeasonId::new(2024).unwrap()];
        loader.run(&two_seasons, true).await.unwrap();

        let stmts = sink.statements.lock().unwrap().clone();
        // Roster spots still flushed for both seasons, games for both too.
        assert_eq!(row_count(&stmts, "roster_spot"), 4);
        assert_eq!(row_count(&stmts, "game"), 2);
        assert_eq!(row_count(&stmts, "play"), 0, "every play flush failed");
        // Views still refreshed.
        assert!(stmts.iter().any(|s| s.starts_with("CREATE MATERIALIZED VIEW")));

        // One dead-letter record per failed season checkpoint.
        let records: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|n| n.starts_with("failed_play_")));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn absent_player_profile_does_not_block_others() {
        let mut fetch = fixture_fetch();
        fetch.landings.remove(&600);

        let sink = RecordingSink::default();
        let dir = temp_dl_dir("absent");
        let mut loader = BatchLoader::new(fetch, sink.clone(), DeadLetter::new(&dir), 4);
        loader.run(&seasons(), false).await.unwrap();

        let stmts = sink.statements.lock().unwrap().clone();
        // Player 500's logs load despite 600's absent profile.
        assert_eq!(row_count(&stmts, "skater_game_log"), 1);
        // 600 still gets a minimal person row from roster data.
        assert_eq!(row_count(&stmts, "person"), 2);
        let person_stmt = stmts
            .iter()
            .find(|s| s.starts_with("INSERT INTO person ("))
            .unwrap();
        assert!(person_stmt.contains("(600, 'Sam', 'Montembeault', 'G', NULL"));
        // But no game log for 600: seasons are unknown without the profile.
        assert_eq!(row_count(&stmts, "goalie_game_log"), 0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn team_seen_in_many_games_accumulates_once() {
        let mut fetch = fixture_fetch();
        // Five games, all between the same two clubs.
        let games: Vec<(i64, i32)> = (100..105).map(|id| (id, 2)).collect();
        fetch
            .schedules
            .insert(("TOR".into(), 20232024), schedule_fixture(&games));
        fetch
            .schedules
            .insert(("MTL".into(), 20232024), schedule_fixture(&games));
        for (id, _) in &games {
            fetch.games.insert(*id, pbp_fixture(*id, 20232024));
        }

        let sink = RecordingSink::default();
        let dir = temp_dl_dir("teamdedup");
        let mut loader = BatchLoader::new(fetch, sink.clone(), DeadLetter::new(&dir), 4);
        loader.run(&seasons(), false).await.unwrap();

        let stmts = sink.statements.lock().unwrap().clone();
        assert_eq!(row_count(&stmts, "team"), 2);
        assert_eq!(row_count(&stmts, "person"), 2);
        assert_eq!(row_count(&stmts, "game"), 5);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn fatal_schema_failure_aborts_run() {
        let sink = RecordingSink {
            fail_tables: vec!["position_code"],
            ..Default::default()
        };
        let dir = temp_dl_dir("fatal");
        let mut loader = BatchLoader::new(fixture_fetch(), sink, DeadLetter::new(&dir), 4);
        let err = loader.run(&seasons(), true).await.unwrap_err();
        assert!(err.to_string().contains("schema setup failed"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
