pub mod schema;

use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use tracing::info;

/// Sink capability consumed by the batch loader: execute one raw SQL
/// statement against the relational store.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<u64>;
}

#[derive(Clone)]
pub struct Db {
    pub pool: PgPool,
}

impl Db {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let mut connect_options = PgConnectOptions::from_str(database_url)?;

        if database_url.contains("sslmode=require") {
            connect_options = connect_options.ssl_mode(PgSslMode::Require);
        }

        // Everything goes through raw_sql, so skip the statement cache; this
        // also keeps PgBouncer transaction mode working.
        connect_options = connect_options.statement_cache_capacity(0);

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(600))
            .connect_with(connect_options)
            .await?;
        info!("connected to db");
        Ok(Self { pool })
    }

    pub async fn execute_raw(&self, sql: &str) -> Result<u64> {
        let done = sqlx::raw_sql(sql).execute(&self.pool).await?;
        Ok(done.rows_affected())
    }
}

#[async_trait]
impl Sink for Db {
    async fn execute(&self, sql: &str) -> Result<u64> {
        self.execute_raw(sql).await
    }
}
