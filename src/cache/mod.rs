//! Time-boxed result cache.
//!
//! The [`Cache`] trait stores JSON values under string keys with a
//! per-entry expiry. Two backends ship with the crate:
//!
//! - [`MemoryCache`]: process-local, the default.
//! - [`SqliteCache`]: the `transients` table, shared across processes so
//!   repeated CLI invocations reuse entries.
//!
//! Expired entries read as misses and are removed lazily on access.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{CacheConfig, Config};
use crate::db;

#[async_trait]
pub trait Cache: Send + Sync {
    /// Returns the live value for `key`, or `None` on a miss or expiry.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Stores `value` under `key` for `ttl`, replacing any existing entry.
    async fn put(&self, key: &str, value: &Value, ttl: Duration) -> Result<()>;

    /// Removes every entry whose key starts with `prefix` and returns how
    /// many were removed.
    async fn clear(&self, prefix: &str) -> Result<u64>;
}

/// Key prefix and lifetime applied to analytics-backed results.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub prefix: String,
    pub ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

impl From<&CacheConfig> for CacheSettings {
    fn from(config: &CacheConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            ttl: Duration::from_secs(config.ttl_secs),
        }
    }
}

impl CacheSettings {
    /// Derive the key for `operation` called with `params`.
    ///
    /// Parameters are sorted by name before joining, so the same inputs
    /// always produce the same key regardless of the order given.
    pub fn key(&self, operation: &str, params: &[(&str, i64)]) -> String {
        let mut params = params.to_vec();
        params.sort_by(|a, b| a.0.cmp(b.0));
        let mut key = format!("{}{}", self.prefix, operation);
        for (name, value) in params {
            key.push('_');
            key.push_str(name);
            key.push('-');
            key.push_str(&value.to_string());
        }
        key
    }
}

/// Build the configured cache backend.
pub async fn from_config(config: &Config) -> Result<Arc<dyn Cache>> {
    match config.cache.backend.as_str() {
        "sqlite" => {
            let pool = db::open(config).await?;
            Ok(Arc::new(SqliteCache::new(pool)))
        }
        _ => Ok(Arc::new(MemoryCache::new())),
    }
}

/// Run `insights cache clear`: drop every entry under the configured prefix.
///
/// Only the persistent backend holds anything between processes, so this
/// always targets the `transients` table.
pub async fn run_cache_clear(config: &Config) -> Result<()> {
    let pool = db::open(config).await?;
    let cache = SqliteCache::new(pool.clone());
    let removed = cache.clear(&config.cache.prefix).await?;
    pool.close().await;
    println!(
        "Removed {} cache entr{} with prefix '{}'",
        removed,
        if removed == 1 { "y" } else { "ies" },
        config.cache.prefix
    );
    Ok(())
}
