//! Response-shape normalization for stats API payloads.
//!
//! The stats API has shipped several shapes for the same data. Each
//! function here checks the known locations in a fixed priority order and
//! falls back to an empty result:
//!
//! | Data         | Lookup order                                          |
//! |--------------|-------------------------------------------------------|
//! | top posts    | `summary.postviews` → `posts` → `top-posts` → `[]`    |
//! | search terms | `summary.search_terms` → `search_terms` → `[]`        |
//! | post views   | `views` → `summary.views` → `stats.views` → `0`       |
//!
//! Counts that are missing, negative or non-numeric become 0.

use serde_json::Value;

use super::{PostViews, TermViews};

fn first_array<'a>(body: &'a Value, paths: &[&[&str]]) -> &'a [Value] {
    paths
        .iter()
        .filter_map(|path| lookup(body, path))
        .find_map(|v| v.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn lookup<'a>(body: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(body, |v, key| v.get(*key))
}

/// Coerce a JSON value to a non-negative count.
pub fn count(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && *f > 0.0)
            .map(|f| f as u64)
            .unwrap_or(0),
        _ => 0,
    }
}

fn post_id(row: &Value) -> Option<i64> {
    ["id", "ID", "post_id"]
        .iter()
        .filter_map(|key| row.get(*key))
        .find_map(|v| match v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .filter(|id| *id > 0)
}

pub fn top_posts(body: &Value) -> Vec<PostViews> {
    let rows = first_array(body, &[&["summary", "postviews"], &["posts"], &["top-posts"]]);
    rows.iter()
        .filter_map(|row| match post_id(row) {
            Some(id) => Some(PostViews {
                id,
                views: count(row.get("views")),
            }),
            None => {
                tracing::warn!(row = %row, "skipping top-posts row without a post id");
                None
            }
        })
        .collect()
}

pub fn search_terms(body: &Value) -> Vec<TermViews> {
    let rows = first_array(body, &[&["summary", "search_terms"], &["search_terms"]]);
    rows.iter()
        .map(|row| TermViews {
            term: row
                .get("term")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            views: count(row.get("views")),
        })
        .collect()
}

pub fn post_views(body: &Value) -> u64 {
    let paths: [&[&str]; 3] = [&["views"], &["summary", "views"], &["stats", "views"]];
    paths
        .iter()
        .find_map(|path| lookup(body, path))
        .map(|v| count(Some(v)))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_posts_priority() {
        let body = json!({
            "summary": { "postviews": [{ "id": 1, "views": 10 }] },
            "posts": [{ "id": 2, "views": 20 }]
        });
        assert_eq!(top_posts(&body), vec![PostViews { id: 1, views: 10 }]);

        let body = json!({ "top-posts": [{ "ID": "3", "views": "7" }] });
        assert_eq!(top_posts(&body), vec![PostViews { id: 3, views: 7 }]);

        assert!(top_posts(&json!({ "unexpected": true })).is_empty());
    }

    #[test]
    fn test_top_posts_skips_rows_without_id() {
        let body = json!({ "posts": [{ "title": "Home page", "views": 99 }, { "id": 5 }] });
        assert_eq!(top_posts(&body), vec![PostViews { id: 5, views: 0 }]);
    }

    #[test]
    fn test_search_terms_priority() {
        let body = json!({
            "summary": { "search_terms": [{ "term": "rust", "views": 4 }] },
            "search_terms": [{ "term": "ignored", "views": 1 }]
        });
        assert_eq!(
            search_terms(&body),
            vec![TermViews { term: "rust".into(), views: 4 }]
        );

        let body = json!({ "search_terms": [{ "views": "x" }] });
        assert_eq!(search_terms(&body), vec![TermViews { term: String::new(), views: 0 }]);
    }

    #[test]
    fn test_post_views_priority() {
        assert_eq!(post_views(&json!({ "views": 12, "summary": { "views": 3 } })), 12);
        assert_eq!(post_views(&json!({ "summary": { "views": "8" } })), 8);
        assert_eq!(post_views(&json!({ "stats": { "views": 5 } })), 5);
        assert_eq!(post_views(&json!({})), 0);
    }

    #[test]
    fn test_count_coercion() {
        assert_eq!(count(Some(&json!(-4))), 0);
        assert_eq!(count(Some(&json!(2.9))), 2);
        assert_eq!(count(Some(&json!(null))), 0);
        assert_eq!(count(Some(&json!("abc"))), 0);
        assert_eq!(count(None), 0);
    }
}
