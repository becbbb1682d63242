//! Analytics source abstraction.
//!
//! An [`AnalyticsSource`] answers three questions: which posts were viewed
//! most, what visitors searched for, and how often one post was viewed.
//! Availability is two separate predicates, a live connection and the stats
//! capability, and both must hold before any ability touches the source.
//!
//! Backends return already-normalized rows; raw response shapes are handled
//! once in [`normalize`].

pub mod http;
pub mod normalize;

pub use http::HttpAnalytics;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::config::AnalyticsConfig;

/// Views recorded for one post over a period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostViews {
    pub id: i64,
    pub views: u64,
}

/// How many times a search term was used over a period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermViews {
    pub term: String,
    pub views: u64,
}

#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    fn is_connected(&self) -> bool;

    fn has_stats_capability(&self) -> bool;

    fn is_available(&self) -> bool {
        self.is_connected() && self.has_stats_capability()
    }

    /// Most-viewed posts over the last `period_days`, in backend ranking
    /// order. Rows may reference posts that no longer exist.
    async fn top_posts(&self, period_days: u32, limit: u32) -> Result<Vec<PostViews>>;

    async fn search_terms(&self, period_days: u32, limit: u32) -> Result<Vec<TermViews>>;

    async fn post_views(&self, post_id: i64, period_days: u32) -> Result<u64>;
}

/// Snapshot of the two availability predicates, for status output.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AnalyticsStatus {
    pub connected: bool,
    pub stats_capability: bool,
}

impl AnalyticsStatus {
    pub fn of(source: &dyn AnalyticsSource) -> Self {
        Self {
            connected: source.is_connected(),
            stats_capability: source.has_stats_capability(),
        }
    }

    pub fn available(&self) -> bool {
        self.connected && self.stats_capability
    }
}

/// Stand-in used when no analytics provider is configured.
pub struct DisabledAnalytics;

#[async_trait]
impl AnalyticsSource for DisabledAnalytics {
    fn is_connected(&self) -> bool {
        false
    }

    fn has_stats_capability(&self) -> bool {
        false
    }

    async fn top_posts(&self, _period_days: u32, _limit: u32) -> Result<Vec<PostViews>> {
        anyhow::bail!("analytics provider is disabled")
    }

    async fn search_terms(&self, _period_days: u32, _limit: u32) -> Result<Vec<TermViews>> {
        anyhow::bail!("analytics provider is disabled")
    }

    async fn post_views(&self, _post_id: i64, _period_days: u32) -> Result<u64> {
        anyhow::bail!("analytics provider is disabled")
    }
}

/// Build the configured analytics source.
pub fn from_config(config: &AnalyticsConfig) -> Result<Arc<dyn AnalyticsSource>> {
    match config.provider.as_str() {
        "http" => Ok(Arc::new(HttpAnalytics::from_config(config)?)),
        _ => Ok(Arc::new(DisabledAnalytics)),
    }
}
