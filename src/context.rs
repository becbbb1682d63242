//! Application context shared by every ability invocation.
//!
//! [`InsightsContext`] is built once at startup and handed to the registry,
//! the HTTP server and the MCP bridge behind an `Arc`. It owns the three
//! collaborators (content store, analytics source, cache) plus the clock.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::analytics::{self, AnalyticsSource};
use crate::cache::{self, Cache, CacheSettings, MemoryCache};
use crate::config::Config;
use crate::content::ContentStore;
use crate::error::AbilityError;
use crate::models::{PostSummary, RawPost};
use crate::sqlite_content::SqliteContentStore;
use crate::timestamps::{self, Clock};
use crate::db;

pub struct InsightsContext {
    pub content: Arc<dyn ContentStore>,
    pub analytics: Arc<dyn AnalyticsSource>,
    pub cache: Arc<dyn Cache>,
    pub cache_settings: CacheSettings,
    pub clock: Clock,
}

impl InsightsContext {
    /// Context with an in-memory cache, default cache settings and the
    /// system clock.
    pub fn new(content: Arc<dyn ContentStore>, analytics: Arc<dyn AnalyticsSource>) -> Self {
        Self {
            content,
            analytics,
            cache: Arc::new(MemoryCache::new()),
            cache_settings: CacheSettings::default(),
            clock: Clock::System,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn Cache>, settings: CacheSettings) -> Self {
        self.cache = cache;
        self.cache_settings = settings;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Wire up the configured backends. Applies the schema so a fresh
    /// database is usable without a separate `init`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let pool = db::open(config).await?;

        let content = Arc::new(SqliteContentStore::new(pool, config.site.clone()));
        let analytics = analytics::from_config(&config.analytics)?;
        let cache = cache::from_config(config).await?;

        Ok(Self::new(content, analytics).with_cache(cache, CacheSettings::from(&config.cache)))
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Read a cached result. Entries that no longer decode as `T` count as
    /// misses.
    pub async fn cached<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AbilityError> {
        let Some(value) = self.cache.get(key).await? else {
            tracing::debug!(key, "cache miss");
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(hit) => {
                tracing::debug!(key, "cache hit");
                Ok(Some(hit))
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring cache entry with unexpected shape");
                Ok(None)
            }
        }
    }

    pub async fn remember<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AbilityError> {
        let value = serde_json::to_value(value).map_err(anyhow::Error::from)?;
        self.cache.put(key, &value, self.cache_settings.ttl).await?;
        Ok(())
    }

    /// Views for one post over `window_days`, cached per `(post, window)`.
    ///
    /// Never fails: an unavailable source or a failed request yields 0,
    /// and that 0 is not cached.
    pub async fn post_views(&self, post_id: i64, window_days: u32) -> u64 {
        if !self.analytics.is_available() {
            return 0;
        }

        let key = self.cache_settings.key(
            "post_views",
            &[("days", window_days as i64), ("post", post_id)],
        );
        match self.cached::<u64>(&key).await {
            Ok(Some(views)) => return views,
            Ok(None) => {}
            Err(e) => tracing::warn!(post_id, error = %e, "view cache read failed"),
        }

        match self.analytics.post_views(post_id, window_days).await {
            Ok(views) => {
                if let Err(e) = self.remember(&key, &views).await {
                    tracing::warn!(post_id, error = %e, "view cache write failed");
                }
                views
            }
            Err(e) => {
                tracing::warn!(post_id, error = %format!("{:#}", e), "post view lookup failed; using 0");
                0
            }
        }
    }

    /// Enrich a stored post with categories, permalink and publish time.
    pub async fn post_summary(&self, post: &RawPost) -> Result<PostSummary, AbilityError> {
        let categories = self.content.categories(post.id).await?;
        let url = self.content.permalink(post.id).await?;
        let date_published = timestamps::resolve(
            &post.date_gmt,
            &post.date_local,
            self.content.site_offset(),
            self.now(),
        );
        Ok(PostSummary {
            post_id: post.id,
            title: post.title.clone(),
            url,
            date_published,
            categories,
        })
    }
}
