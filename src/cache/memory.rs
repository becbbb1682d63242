//! In-process [`Cache`] backed by a `HashMap` behind `std::sync::RwLock`.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;

use super::Cache;

struct Entry {
    value: Value,
    expires_at: Instant,
}

pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> anyhow::Error {
    anyhow!("memory cache lock poisoned")
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().map_err(|_| poisoned())?;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if now < entry.expires_at => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        if entries.get(key).is_some_and(|e| now >= e.expires_at) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn put(&self, key: &str, value: &Value, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        // Keys that are never read again would otherwise stay forever.
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(
            key.to_string(),
            Entry {
                value: value.clone(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn clear(&self, prefix: &str) -> Result<u64> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok((before - entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = MemoryCache::new();
        cache
            .put("k", &json!([1, 2]), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(json!([1, 2])));
        assert_eq!(cache.get("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_miss_and_removed() {
        let cache = MemoryCache::new();
        cache.put("k", &json!(1), Duration::ZERO).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_put_sweeps_expired_entries() {
        let cache = MemoryCache::new();
        for i in 0..1000 {
            cache
                .put(&format!("post_views_{}", i), &json!(0), Duration::ZERO)
                .await
                .unwrap();
        }
        cache
            .put("live", &json!(1), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("live").await.unwrap(), Some(json!(1)));
    }

    #[tokio::test]
    async fn test_clear_by_prefix() {
        let cache = MemoryCache::new();
        let ttl = Duration::from_secs(60);
        cache.put("ei_a", &json!(1), ttl).await.unwrap();
        cache.put("ei_b", &json!(2), ttl).await.unwrap();
        cache.put("other", &json!(3), ttl).await.unwrap();
        assert_eq!(cache.clear("ei_").await.unwrap(), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("other").await.unwrap(), Some(json!(3)));
    }
}
