//! `editorial-insights/get-top-posts`: most-viewed published posts.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_input, post_rows_schema, to_output};
use crate::context::InsightsContext;
use crate::error::AbilityError;
use crate::models::TopPost;
use crate::traits::Ability;

/// The backend is asked for this many times `limit` rows, since rows for
/// deleted or unpublished posts are skipped.
const HEADROOM: u32 = 2;

#[derive(Debug, Clone, Deserialize)]
pub struct TopPostsInput {
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_days() -> u32 {
    30
}
fn default_limit() -> u32 {
    10
}

impl Default for TopPostsInput {
    fn default() -> Self {
        Self {
            days: default_days(),
            limit: default_limit(),
        }
    }
}

pub async fn top_posts(
    ctx: &InsightsContext,
    input: &TopPostsInput,
) -> Result<Vec<TopPost>, AbilityError> {
    if !ctx.analytics.is_available() {
        return Err(AbilityError::AnalyticsUnavailable);
    }

    let key = ctx.cache_settings.key(
        "top_posts",
        &[("days", input.days as i64), ("limit", input.limit as i64)],
    );
    if let Some(hit) = ctx.cached::<Vec<TopPost>>(&key).await? {
        return Ok(hit);
    }

    let ranked = ctx
        .analytics
        .top_posts(input.days, input.limit.saturating_mul(HEADROOM))
        .await
        .map_err(AbilityError::backend)?;

    let limit = input.limit as usize;
    let mut posts = Vec::with_capacity(limit);
    for row in ranked {
        if posts.len() >= limit {
            break;
        }
        let post = match ctx.content.get_post(row.id).await? {
            Some(post) if post.is_published() => post,
            Some(post) => {
                tracing::debug!(post_id = row.id, status = %post.status, "skipping unpublished post");
                continue;
            }
            None => {
                tracing::debug!(post_id = row.id, "skipping unknown post");
                continue;
            }
        };
        posts.push(TopPost {
            post: ctx.post_summary(&post).await?,
            views: row.views,
        });
    }

    ctx.remember(&key, &posts).await?;
    Ok(posts)
}

pub struct GetTopPosts;

#[async_trait]
impl Ability for GetTopPosts {
    fn name(&self) -> &str {
        "editorial-insights/get-top-posts"
    }

    fn label(&self) -> &str {
        "Get Top Posts"
    }

    fn description(&self) -> &str {
        "List the most-viewed published posts over the last 7, 30 or 90 days, with view counts, permalinks and categories."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "days": {
                    "type": "integer",
                    "enum": [7, 30, 90],
                    "default": 30,
                    "description": "Reporting period in days"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 50,
                    "default": 10,
                    "description": "Maximum number of posts to return"
                }
            },
            "additionalProperties": false
        })
    }

    fn output_schema(&self) -> Value {
        post_rows_schema(json!({
            "views": { "type": "integer", "minimum": 0, "description": "Views in the period" }
        }))
    }

    async fn execute(&self, input: Value, ctx: &InsightsContext) -> Result<Value, AbilityError> {
        let input: TopPostsInput = parse_input(input)?;
        to_output(&top_posts(ctx, &input).await?)
    }
}
