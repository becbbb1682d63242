//! SQLite-backed [`Cache`] over the `transients` table.
//!
//! Values are stored as JSON text with an absolute expiry in Unix seconds.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{Row, SqlitePool};

use super::Cache;

pub struct SqliteCache {
    pool: SqlitePool,
}

impl SqliteCache {
    /// Wrap a pool whose schema has already been migrated.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Cache for SqliteCache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let row = sqlx::query("SELECT value, expires_at FROM transients WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let expires_at: i64 = row.get("expires_at");
        if Utc::now().timestamp() >= expires_at {
            sqlx::query("DELETE FROM transients WHERE key = ? AND expires_at = ?")
                .bind(key)
                .bind(expires_at)
                .execute(&self.pool)
                .await?;
            return Ok(None);
        }

        let raw: String = row.get("value");
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding undecodable cache entry");
                Ok(None)
            }
        }
    }

    async fn put(&self, key: &str, value: &Value, ttl: Duration) -> Result<()> {
        let now = Utc::now().timestamp();
        sqlx::query("DELETE FROM transients WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?;

        let expires_at = now + ttl.as_secs() as i64;
        sqlx::query(
            r#"
            INSERT INTO transients (key, value, expires_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at
            "#,
        )
        .bind(key)
        .bind(serde_json::to_string(value)?)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn clear(&self, prefix: &str) -> Result<u64> {
        // substr() instead of LIKE: prefixes contain `_`, a LIKE wildcard.
        let result = sqlx::query("DELETE FROM transients WHERE substr(key, 1, length(?1)) = ?1")
            .bind(prefix)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;
    use tempfile::TempDir;

    async fn cache() -> (TempDir, SqliteCache) {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::minimal();
        config.db.path = tmp.path().join("cache.sqlite");
        let pool = crate::db::open(&config).await.unwrap();
        (tmp, SqliteCache::new(pool))
    }

    #[tokio::test]
    async fn test_roundtrip_and_overwrite() {
        let (_tmp, cache) = cache().await;
        let ttl = Duration::from_secs(60);
        cache.put("k", &json!({"a": 1}), ttl).await.unwrap();
        cache.put("k", &json!({"a": 2}), ttl).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(json!({"a": 2})));
    }

    #[tokio::test]
    async fn test_expired_entry_removed() {
        let (_tmp, cache) = cache().await;
        cache.put("k", &json!(1), Duration::ZERO).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert_eq!(cache.clear("").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_put_sweeps_expired_rows() {
        let (_tmp, cache) = cache().await;
        for i in 0..50 {
            cache
                .put(&format!("post_views_{}", i), &json!(0), Duration::ZERO)
                .await
                .unwrap();
        }
        cache
            .put("live", &json!(1), Duration::from_secs(60))
            .await
            .unwrap();

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transients")
            .fetch_one(&cache.pool)
            .await
            .unwrap();
        assert_eq!(rows, 1);
        assert_eq!(cache.get("live").await.unwrap(), Some(json!(1)));
    }

    #[tokio::test]
    async fn test_clear_treats_underscore_literally() {
        let (_tmp, cache) = cache().await;
        let ttl = Duration::from_secs(60);
        cache.put("ei_one", &json!(1), ttl).await.unwrap();
        cache.put("eiXtwo", &json!(2), ttl).await.unwrap();
        assert_eq!(cache.clear("ei_").await.unwrap(), 1);
        assert!(cache.get("eiXtwo").await.unwrap().is_some());
    }
}
