//! Content store abstraction.
//!
//! The [`ContentStore`] trait is everything the abilities need from the
//! CMS: filtered post queries, single-post lookup, category names and
//! permalinks. [`SqliteContentStore`](crate::sqlite_content::SqliteContentStore)
//! reads a local mirror of the CMS tables.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};

use crate::models::{PostStatus, RawPost};

/// Which date pair a query filters or orders on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateColumn {
    Published,
    Modified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Keep only posts whose `column` lies strictly before `before`.
#[derive(Debug, Clone, Copy)]
pub struct DateFilter {
    pub column: DateColumn,
    pub before: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PostQuery {
    pub status: PostStatus,
    pub date_filter: Option<DateFilter>,
    pub order_by: DateColumn,
    pub order: SortOrder,
    pub limit: usize,
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn query_posts(&self, query: &PostQuery) -> Result<Vec<RawPost>>;

    async fn get_post(&self, post_id: i64) -> Result<Option<RawPost>>;

    /// Category names for a post, alphabetically.
    async fn categories(&self, post_id: i64) -> Result<Vec<String>>;

    async fn permalink(&self, post_id: i64) -> Result<String>;

    /// Offset of the site-local date columns from UTC.
    fn site_offset(&self) -> FixedOffset;
}
