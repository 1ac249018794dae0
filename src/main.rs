use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use puckload::api::NhlClient;
use puckload::db::Db;
use puckload::ingest::{BatchLoader, DeadLetter};
use puckload::season::SeasonId;
use puckload::util::env as env_util;
use puckload::trace;

/// Backfill NHL seasons into Postgres and rebuild the derived stat views.
#[derive(Parser, Debug)]
#[command(name = "puckload", version, about)]
struct Args {
    /// Season to load, as a start year (2023) or packed pair (20232024).
    /// Repeatable; defaults to the 2023-24 season.
    #[arg(long = "season")]
    seasons: Vec<SeasonId>,

    /// Directory for fetched-JSON artifacts reused across runs.
    #[arg(long, default_value = "cache")]
    cache_dir: PathBuf,

    /// Directory for failed-batch records.
    #[arg(long, default_value = "dead_letters")]
    dead_letter_dir: PathBuf,

    /// Concurrent play-by-play fetches in flight.
    #[arg(long, default_value_t = 4)]
    fanout: usize,

    /// Database DSN; falls back to DATABASE_URL / DB_URL.
    #[arg(long)]
    database_url: Option<String>,

    /// Skip the materialized-view rebuild at the end of the run.
    #[arg(long)]
    skip_views: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_util::init_env();
    trace::init_tracing("info,sqlx=warn")?;
    let args = Args::parse();

    let seasons = if args.seasons.is_empty() {
        vec![SeasonId::new(2023)?]
    } else {
        args.seasons.clone()
    };

    let database_url = match &args.database_url {
        Some(url) => url.clone(),
        None => env_util::db_url()?,
    };
    let max_connections = env_util::env_parse("DB_MAX_CONNS", 5);
    let db = Db::connect(&database_url, max_connections)
        .await
        .context("connecting to database")?;

    let client = NhlClient::new(&args.cache_dir)?;
    let dead_letters = DeadLetter::new(&args.dead_letter_dir);
    let mut loader = BatchLoader::new(client, db, dead_letters, args.fanout);

    let season_list = seasons
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(",");
    info!(seasons = %season_list, fanout = args.fanout, "starting backfill");
    loader.run(&seasons, !args.skip_views).await
}
