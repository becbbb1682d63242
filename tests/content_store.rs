//! Integration tests for the SQLite content store and the SQLite cache,
//! run against a real database in a temp directory.

use chrono::{DateTime, Utc};
use editorial_insights::abilities::{stale_drafts, StaleDraftsInput};
use editorial_insights::analytics::DisabledAnalytics;
use editorial_insights::cache::{Cache, CacheSettings, SqliteCache};
use editorial_insights::config::Config;
use editorial_insights::content::{ContentStore, DateColumn, DateFilter, PostQuery, SortOrder};
use editorial_insights::context::InsightsContext;
use editorial_insights::models::PostStatus;
use editorial_insights::sqlite_content::SqliteContentStore;
use editorial_insights::timestamps::{Clock, ZERO_DATE};
use editorial_insights::{db, migrate};
use serde_json::json;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn test_config(tmp: &TempDir) -> Config {
    let config_str = format!(
        r#"
[db]
path = "{}"

[site]
url = "https://blog.example.com"
utc_offset_minutes = 60
permalink_structure = "/{{slug}}/"

[server]
bind = "127.0.0.1:0"

[cache]
backend = "sqlite"
"#,
        tmp.path().join("insights.sqlite").display()
    );
    toml::from_str(&config_str).unwrap()
}

fn utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

#[allow(clippy::too_many_arguments)]
async fn insert_post(
    pool: &SqlitePool,
    id: i64,
    status: &str,
    title: &str,
    content: &str,
    date_local: &str,
    date_gmt: &str,
    modified_local: &str,
    modified_gmt: &str,
) {
    sqlx::query(
        "INSERT INTO posts (id, title, content, status, slug, post_date, post_date_gmt, post_modified, post_modified_gmt)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(title)
    .bind(content)
    .bind(status)
    .bind(format!("post-{}", id))
    .bind(date_local)
    .bind(date_gmt)
    .bind(modified_local)
    .bind(modified_gmt)
    .execute(pool)
    .await
    .unwrap();
}

async fn seeded() -> (TempDir, Config, SqlitePool) {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    migrate::run_migrations(&cfg).await.unwrap();
    let pool = db::connect(&cfg).await.unwrap();

    insert_post(
        &pool,
        1,
        "publish",
        "Launch",
        "<p>Hello</p>",
        "2024-01-01 10:00:00",
        "2024-01-01 09:00:00",
        "2024-01-02 10:00:00",
        "2024-01-02 09:00:00",
    )
    .await;
    insert_post(
        &pool,
        2,
        "draft",
        "Idea",
        "Some draft words here",
        "2024-02-01 10:00:00",
        ZERO_DATE,
        "2024-02-05 10:00:00",
        "2024-02-05 09:00:00",
    )
    .await;
    insert_post(
        &pool,
        3,
        "draft",
        "",
        "",
        "2023-06-01 10:00:00",
        ZERO_DATE,
        "2023-06-01 10:00:00",
        "2023-06-01 09:00:00",
    )
    .await;
    insert_post(
        &pool,
        4,
        "draft",
        "Recent",
        "new",
        "2025-05-20 10:00:00",
        ZERO_DATE,
        "2025-05-30 10:00:00",
        "2025-05-30 09:00:00",
    )
    .await;

    sqlx::query("INSERT INTO categories (id, name, slug) VALUES (1, 'Rust', 'rust'), (2, 'News', 'news')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO post_categories (post_id, category_id) VALUES (1, 1), (1, 2), (2, 1)")
        .execute(&pool)
        .await
        .unwrap();

    (tmp, cfg, pool)
}

#[tokio::test]
async fn test_init_is_idempotent() {
    let (_tmp, cfg, _pool) = seeded().await;
    migrate::run_migrations(&cfg).await.unwrap();
}

#[tokio::test]
async fn test_query_drafts_by_modified_ascending() {
    let (_tmp, cfg, pool) = seeded().await;
    let store = SqliteContentStore::new(pool, cfg.site.clone());

    let posts = store
        .query_posts(&PostQuery {
            status: PostStatus::Draft,
            date_filter: Some(DateFilter {
                column: DateColumn::Modified,
                before: utc("2025-01-01T00:00:00Z"),
            }),
            order_by: DateColumn::Modified,
            order: SortOrder::Asc,
            limit: 10,
        })
        .await
        .unwrap();

    let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![3, 2]);
}

#[tokio::test]
async fn test_date_filter_skips_unset_local_dates() {
    let (_tmp, cfg, pool) = seeded().await;
    insert_post(
        &pool,
        5,
        "draft",
        "Imported",
        "no local dates",
        ZERO_DATE,
        ZERO_DATE,
        ZERO_DATE,
        "2025-05-31 09:00:00",
    )
    .await;
    let store = SqliteContentStore::new(pool, cfg.site.clone());

    let posts = store
        .query_posts(&PostQuery {
            status: PostStatus::Draft,
            date_filter: Some(DateFilter {
                column: DateColumn::Modified,
                before: utc("2025-01-01T00:00:00Z"),
            }),
            order_by: DateColumn::Modified,
            order: SortOrder::Asc,
            limit: 10,
        })
        .await
        .unwrap();

    let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![3, 2]);
}

#[tokio::test]
async fn test_query_limit_and_descending_order() {
    let (_tmp, cfg, pool) = seeded().await;
    let store = SqliteContentStore::new(pool, cfg.site.clone());

    let posts = store
        .query_posts(&PostQuery {
            status: PostStatus::Draft,
            date_filter: None,
            order_by: DateColumn::Published,
            order: SortOrder::Desc,
            limit: 2,
        })
        .await
        .unwrap();

    let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![4, 2]);
}

#[tokio::test]
async fn test_lookup_categories_and_permalink() {
    let (_tmp, cfg, pool) = seeded().await;
    let store = SqliteContentStore::new(pool, cfg.site.clone());

    let post = store.get_post(1).await.unwrap().unwrap();
    assert!(post.is_published());
    assert_eq!(post.title, "Launch");
    assert!(store.get_post(99).await.unwrap().is_none());

    assert_eq!(store.categories(1).await.unwrap(), vec!["News", "Rust"]);
    assert!(store.categories(3).await.unwrap().is_empty());

    assert_eq!(
        store.permalink(1).await.unwrap(),
        "https://blog.example.com/post-1/"
    );
}

#[tokio::test]
async fn test_stale_drafts_against_sqlite() {
    let (_tmp, cfg, pool) = seeded().await;
    let store = Arc::new(SqliteContentStore::new(pool, cfg.site.clone()));
    let ctx = InsightsContext::new(store, Arc::new(DisabledAnalytics))
        .with_clock(Clock::Fixed(utc("2025-06-01T00:00:00Z")));

    let out = stale_drafts(&ctx, &StaleDraftsInput::default()).await.unwrap();

    let ids: Vec<i64> = out.iter().map(|d| d.post_id).collect();
    assert_eq!(ids, vec![3, 2]);

    // Zeroed UTC creation date: local 10:00 at +01:00 is 09:00 UTC.
    assert_eq!(out[1].date_created, utc("2024-02-01T09:00:00Z"));
    assert_eq!(out[1].date_modified, utc("2024-02-05T09:00:00Z"));
    assert_eq!(out[1].categories, vec!["Rust"]);
    assert_eq!(out[1].word_count, 4);

    assert_eq!(out[0].title, "Untitled");
    assert_eq!(out[0].excerpt, "");
    assert_eq!(out[0].word_count, 0);
}

#[tokio::test]
async fn test_sqlite_cache_shared_across_pools() {
    let (_tmp, cfg, pool) = seeded().await;
    let settings = CacheSettings::from(&cfg.cache);
    let key = settings.key("search_terms", &[("days", 30), ("limit", 20)]);

    SqliteCache::new(pool)
        .put(&key, &json!([{ "term": "rust", "count": 3 }]), Duration::from_secs(60))
        .await
        .unwrap();

    // A second process would open its own pool.
    let other = SqliteCache::new(db::connect(&cfg).await.unwrap());
    assert_eq!(
        other.get(&key).await.unwrap(),
        Some(json!([{ "term": "rust", "count": 3 }]))
    );
    assert_eq!(other.clear(&cfg.cache.prefix).await.unwrap(), 1);
    assert_eq!(other.get(&key).await.unwrap(), None);
}

#[tokio::test]
async fn test_context_from_config() {
    let (_tmp, cfg, _pool) = seeded().await;
    let ctx = InsightsContext::from_config(&cfg).await.unwrap();
    assert!(!ctx.analytics.is_available());
    assert_eq!(ctx.cache_settings.ttl, Duration::from_secs(900));
    assert_eq!(ctx.post_views(1, 30).await, 0);
}
