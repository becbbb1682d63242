//! SQLite-backed [`ContentStore`].
//!
//! Reads the `posts`, `categories` and `post_categories` tables created by
//! `insights init`. Date filters compare against the site-local columns,
//! the same columns the CMS itself filters on, after converting the cutoff
//! into site-local time.

use anyhow::Result;
use async_trait::async_trait;
use chrono::FixedOffset;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::config::SiteConfig;
use crate::content::{ContentStore, DateColumn, PostQuery, SortOrder};
use crate::models::RawPost;
use crate::timestamps;

const POST_COLUMNS: &str = "id, title, content, status, slug, post_date, post_date_gmt, post_modified, post_modified_gmt";

pub struct SqliteContentStore {
    pool: SqlitePool,
    site: SiteConfig,
}

impl SqliteContentStore {
    pub fn new(pool: SqlitePool, site: SiteConfig) -> Self {
        Self { pool, site }
    }
}

fn local_column(column: DateColumn) -> &'static str {
    match column {
        DateColumn::Published => "post_date",
        DateColumn::Modified => "post_modified",
    }
}

fn row_to_post(row: &SqliteRow) -> RawPost {
    RawPost {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        status: row.get("status"),
        slug: row.get("slug"),
        date_local: row.get("post_date"),
        date_gmt: row.get("post_date_gmt"),
        modified_local: row.get("post_modified"),
        modified_gmt: row.get("post_modified_gmt"),
    }
}

/// Expand a permalink template against the site URL.
pub fn build_permalink(site: &SiteConfig, post_id: i64, slug: &str) -> String {
    let path = site
        .permalink_structure
        .replace("{id}", &post_id.to_string())
        .replace("{slug}", slug);
    let base = site.url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

#[async_trait]
impl ContentStore for SqliteContentStore {
    async fn query_posts(&self, query: &PostQuery) -> Result<Vec<RawPost>> {
        let order = match query.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let order_column = local_column(query.order_by);

        let mut sql = format!("SELECT {} FROM posts WHERE status = ?", POST_COLUMNS);
        if let Some(filter) = &query.date_filter {
            // An unset date sorts before every cutoff; it never qualifies.
            let column = local_column(filter.column);
            sql.push_str(&format!(" AND {} <> ? AND {} < ?", column, column));
        }
        sql.push_str(&format!(
            " ORDER BY {} {}, id {} LIMIT ?",
            order_column, order, order
        ));

        let mut q = sqlx::query(&sql).bind(query.status.as_str());
        if let Some(filter) = &query.date_filter {
            q = q
                .bind(timestamps::ZERO_DATE)
                .bind(timestamps::to_local_stored(filter.before, self.site_offset()));
        }
        let rows = q.bind(query.limit as i64).fetch_all(&self.pool).await?;

        Ok(rows.iter().map(row_to_post).collect())
    }

    async fn get_post(&self, post_id: i64) -> Result<Option<RawPost>> {
        let row = sqlx::query(&format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS))
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_post))
    }

    async fn categories(&self, post_id: i64) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT c.name AS name
            FROM categories c
            JOIN post_categories pc ON pc.category_id = c.id
            WHERE pc.post_id = ?
            ORDER BY c.name ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|row| row.get("name")).collect())
    }

    async fn permalink(&self, post_id: i64) -> Result<String> {
        let slug: Option<String> = sqlx::query("SELECT slug FROM posts WHERE id = ?")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| row.get("slug"));

        Ok(build_permalink(
            &self.site,
            post_id,
            slug.as_deref().unwrap_or_default(),
        ))
    }

    fn site_offset(&self) -> FixedOffset {
        timestamps::site_offset(self.site.utc_offset_minutes)
    }
}
