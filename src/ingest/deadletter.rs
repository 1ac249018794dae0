//! Dead-letter records for failed batch flushes.
//!
//! When a sink write fails, the statement that was about to be executed is
//! preserved as a structured JSON artifact (entity type, checkpoint, cause,
//! payload) so an operator can inspect and replay it; the run continues.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use super::accumulator::EntityKind;

#[derive(Serialize)]
struct FailedBatch<'a> {
    entity: &'a str,
    checkpoint: &'a str,
    cause: String,
    statement: &'a str,
    failed_at: String,
}

pub struct DeadLetter {
    dir: PathBuf,
}

impl DeadLetter {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Persist one failed flush. Returns the path of the written record.
    pub fn record(
        &self,
        kind: EntityKind,
        checkpoint: &str,
        cause: &anyhow::Error,
        statement: &str,
    ) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir).context("creating dead-letter dir")?;
        let record = FailedBatch {
            entity: kind.table(),
            checkpoint,
            cause: format!("{cause:#}"),
            statement,
            failed_at: Utc::now().to_rfc3339(),
        };
        let name = format!(
            "failed_{}_{}_{}.json",
            kind.table(),
            checkpoint,
            Utc::now().format("%Y%m%d_%H%M%S%f")
        );
        let path = self.dir.join(name);
        let body = serde_json::to_string_pretty(&record)?;
        std::fs::write(&path, body).context("writing dead-letter record")?;
        Ok(path)
    }
}
