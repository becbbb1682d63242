use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

/// Create the content mirror and transient cache tables. Idempotent.
pub async fn run_migrations(config: &Config) -> Result<()> {
    db::open(config).await?.close().await;
    Ok(())
}

pub async fn apply(pool: &SqlitePool) -> Result<()> {
    // Dates are stored the way the CMS stores them: `YYYY-MM-DD HH:MM:SS`,
    // with `0000-00-00 00:00:00` meaning "unset".
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL DEFAULT '',
            content TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL,
            slug TEXT NOT NULL DEFAULT '',
            post_date TEXT NOT NULL DEFAULT '0000-00-00 00:00:00',
            post_date_gmt TEXT NOT NULL DEFAULT '0000-00-00 00:00:00',
            post_modified TEXT NOT NULL DEFAULT '0000-00-00 00:00:00',
            post_modified_gmt TEXT NOT NULL DEFAULT '0000-00-00 00:00:00'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS post_categories (
            post_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            PRIMARY KEY (post_id, category_id),
            FOREIGN KEY (post_id) REFERENCES posts(id),
            FOREIGN KEY (category_id) REFERENCES categories(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transients (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            expires_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_posts_status_date ON posts(status, post_date)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_posts_status_modified ON posts(status, post_modified)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_post_categories_post ON post_categories(post_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
