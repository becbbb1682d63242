//! SQLite pool shared by the content store and the transient cache.
//!
//! Several `insights` processes may hold the same file open (a running
//! server plus a `cache clear`), so writers wait on a busy timeout instead
//! of failing with `SQLITE_BUSY`.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::config::Config;
use crate::migrate;

const MAX_CONNECTIONS: u32 = 5;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connect without touching the schema.
pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let db_path = &config.db.path;

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating database directory {}", parent.display()))?;
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await
        .with_context(|| format!("opening database {}", db_path.display()))
}

/// Connect and bring the schema up to date, so a fresh file is usable
/// without a separate `insights init`.
pub async fn open(config: &Config) -> Result<SqlitePool> {
    let pool = connect(config).await?;
    migrate::apply(&pool).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(tmp: &TempDir) -> Config {
        let mut config = Config::minimal();
        config.db.path = tmp.path().join("nested").join("insights.sqlite");
        config
    }

    #[tokio::test]
    async fn test_connect_sets_busy_timeout_and_wal() {
        let tmp = TempDir::new().unwrap();
        let pool = connect(&config(&tmp)).await.unwrap();

        let timeout: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(timeout, 5000);

        let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn test_open_applies_schema() {
        let tmp = TempDir::new().unwrap();
        let pool = open(&config(&tmp)).await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        for table in ["categories", "post_categories", "posts", "transients"] {
            assert!(tables.iter().any(|t| t == table), "missing {}", table);
        }
    }
}
