//! HTTP stats API client.
//!
//! Talks to a WordPress.com-style stats REST API:
//!
//! ```text
//! GET {base_url}/sites/{site_id}/stats/top-posts?period=day&num={days}&max={limit}&summarize=1
//! GET {base_url}/sites/{site_id}/stats/search-terms?period=day&num={days}&max={limit}&summarize=1
//! GET {base_url}/sites/{site_id}/stats/post/{post_id}?period=day&num={days}
//! ```
//!
//! Requests carry `Authorization: Bearer {api_token}`. Non-2xx responses
//! and bodies with an `error` field become errors carrying the backend's
//! message.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use super::{normalize, AnalyticsSource, PostViews, TermViews};
use crate::config::AnalyticsConfig;

pub struct HttpAnalytics {
    client: reqwest::Client,
    base_url: String,
    site_id: String,
    api_token: String,
    stats_enabled: bool,
}

impl HttpAnalytics {
    pub fn new(
        base_url: &str,
        site_id: &str,
        api_token: &str,
        stats_enabled: bool,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            site_id: site_id.to_string(),
            api_token: api_token.to_string(),
            stats_enabled,
        })
    }

    pub fn from_config(config: &AnalyticsConfig) -> Result<Self> {
        Self::new(
            config.base_url.as_deref().unwrap_or_default(),
            config.site_id.as_deref().unwrap_or_default(),
            config.api_token.as_deref().unwrap_or_default(),
            config.stats_enabled,
            Duration::from_secs(config.timeout_secs),
        )
    }

    async fn fetch(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}/sites/{}/stats/{}", self.base_url, self.site_id, path);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .query(query)
            .send()
            .await
            .with_context(|| format!("stats request to '{}' failed", path))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&body_text)
                .ok()
                .and_then(|v| error_message(&v))
                .unwrap_or(body_text);
            bail!("stats API error {}: {}", status, message);
        }

        let body: Value = response
            .json()
            .await
            .with_context(|| format!("stats response for '{}' was not JSON", path))?;

        if let Some(message) = error_message(&body) {
            bail!("stats API error: {}", message);
        }

        Ok(body)
    }
}

fn error_message(body: &Value) -> Option<String> {
    let error = body.get("error")?;
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .unwrap_or("unknown error");
    Some(message.to_string())
}

fn period_query(days: u32) -> Vec<(&'static str, String)> {
    vec![("period", "day".to_string()), ("num", days.to_string())]
}

#[async_trait]
impl AnalyticsSource for HttpAnalytics {
    fn is_connected(&self) -> bool {
        !self.base_url.is_empty() && !self.site_id.is_empty() && !self.api_token.is_empty()
    }

    fn has_stats_capability(&self) -> bool {
        self.stats_enabled
    }

    async fn top_posts(&self, period_days: u32, limit: u32) -> Result<Vec<PostViews>> {
        let mut query = period_query(period_days);
        query.push(("max", limit.to_string()));
        query.push(("summarize", "1".to_string()));
        let body = self.fetch("top-posts", &query).await?;
        Ok(normalize::top_posts(&body))
    }

    async fn search_terms(&self, period_days: u32, limit: u32) -> Result<Vec<TermViews>> {
        let mut query = period_query(period_days);
        query.push(("max", limit.to_string()));
        query.push(("summarize", "1".to_string()));
        let body = self.fetch("search-terms", &query).await?;
        Ok(normalize::search_terms(&body))
    }

    async fn post_views(&self, post_id: i64, period_days: u32) -> Result<u64> {
        let body = self
            .fetch(&format!("post/{}", post_id), &period_query(period_days))
            .await?;
        Ok(normalize::post_views(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_connection_requires_credentials() {
        let source =
            HttpAnalytics::new("https://stats.test/", "42", "", true, Duration::from_secs(1))
                .unwrap();
        assert!(!source.is_connected());
        assert!(source.has_stats_capability());
        assert!(!source.is_available());
    }

    #[test]
    fn test_error_message_extraction() {
        let body = json!({ "error": "unauthorized", "message": "Token expired" });
        assert_eq!(error_message(&body).as_deref(), Some("Token expired"));
        let body = json!({ "error": "unknown_blog" });
        assert_eq!(error_message(&body).as_deref(), Some("unknown_blog"));
        assert_eq!(error_message(&json!({ "views": 1 })), None);
    }
}
