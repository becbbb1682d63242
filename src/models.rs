//! Core data models used throughout Editorial Insights.
//!
//! [`RawPost`] is what the content store hands back; the remaining types are
//! the records the abilities return. Output records serialize with the
//! snake_case field names published in each ability's output schema and are
//! also what gets written to the cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStatus {
    Publish,
    Draft,
    Pending,
    Private,
    Future,
    Trash,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Publish => "publish",
            PostStatus::Draft => "draft",
            PostStatus::Pending => "pending",
            PostStatus::Private => "private",
            PostStatus::Future => "future",
            PostStatus::Trash => "trash",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A post row as stored by the CMS.
///
/// Timestamps are kept in their stored text form (`YYYY-MM-DD HH:MM:SS`)
/// because either column of a pair may hold the zero sentinel. Use
/// [`crate::timestamps::resolve`] to turn a pair into an absolute time.
#[derive(Debug, Clone)]
pub struct RawPost {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub status: String,
    pub slug: String,
    pub date_local: String,
    pub date_gmt: String,
    pub modified_local: String,
    pub modified_gmt: String,
}

impl RawPost {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Publish.as_str()
    }
}

/// Fields shared by every post-shaped result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub post_id: i64,
    pub title: String,
    pub url: String,
    pub date_published: DateTime<Utc>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPost {
    #[serde(flatten)]
    pub post: PostSummary,
    pub views: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchTerm {
    pub term: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaleDraft {
    pub post_id: i64,
    pub title: String,
    pub excerpt: String,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    pub days_since_modified: u64,
    pub categories: Vec<String>,
    pub word_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderperformingPost {
    #[serde(flatten)]
    pub post: PostSummary,
    pub views: u64,
    pub word_count: u64,
}
