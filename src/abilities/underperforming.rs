//! `editorial-insights/get-underperforming-posts`: older published posts
//! that drew few views over their lifetime window.

use async_trait::async_trait;
use chrono::Duration;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_input, post_rows_schema, to_output};
use crate::content::{DateColumn, DateFilter, PostQuery, SortOrder};
use crate::context::InsightsContext;
use crate::error::AbilityError;
use crate::models::{PostStatus, UnderperformingPost};
use crate::text::word_count;
use crate::timestamps::resolve;
use crate::traits::Ability;

/// Candidates fetched per requested row; most old posts clear the
/// threshold and get skipped.
const OVERFETCH: usize = 3;

#[derive(Debug, Clone, Deserialize)]
pub struct UnderperformingInput {
    #[serde(default = "default_days_published")]
    pub days_published: u32,
    #[serde(default = "default_max_views")]
    pub max_views: u64,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_days_published() -> u32 {
    90
}
fn default_max_views() -> u64 {
    100
}
fn default_limit() -> u32 {
    20
}

impl Default for UnderperformingInput {
    fn default() -> Self {
        Self {
            days_published: default_days_published(),
            max_views: default_max_views(),
            limit: default_limit(),
        }
    }
}

/// Posts published at least `days_published` ago with fewer than
/// `max_views` views over that window, fewest views first.
pub async fn underperforming_posts(
    ctx: &InsightsContext,
    input: &UnderperformingInput,
) -> Result<Vec<UnderperformingPost>, AbilityError> {
    if !ctx.analytics.is_available() {
        return Err(AbilityError::AnalyticsRequired);
    }

    let now = ctx.now();
    let cutoff = now - Duration::days(input.days_published as i64);
    let limit = input.limit as usize;

    let candidates = ctx
        .content
        .query_posts(&PostQuery {
            status: PostStatus::Publish,
            date_filter: Some(DateFilter {
                column: DateColumn::Published,
                before: cutoff,
            }),
            order_by: DateColumn::Published,
            order: SortOrder::Asc,
            limit: limit.saturating_mul(OVERFETCH),
        })
        .await?;

    let offset = ctx.content.site_offset();
    let mut out = Vec::with_capacity(limit);
    for post in candidates {
        if out.len() >= limit {
            break;
        }
        if resolve(&post.date_gmt, &post.date_local, offset, now) > cutoff {
            continue;
        }

        let views = ctx.post_views(post.id, input.days_published).await;
        if views >= input.max_views {
            continue;
        }

        out.push(UnderperformingPost {
            post: ctx.post_summary(&post).await?,
            views,
            word_count: word_count(&post.content),
        });
    }

    out.sort_by_key(|p| p.views);
    Ok(out)
}

pub struct GetUnderperformingPosts;

#[async_trait]
impl Ability for GetUnderperformingPosts {
    fn name(&self) -> &str {
        "editorial-insights/get-underperforming-posts"
    }

    fn label(&self) -> &str {
        "Get Underperforming Posts"
    }

    fn description(&self) -> &str {
        "Find published posts older than a given age whose views stay below a threshold, fewest views first."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "days_published": {
                    "type": "integer",
                    "minimum": 30,
                    "maximum": 730,
                    "default": 90,
                    "description": "Minimum post age in days; also the window views are counted over"
                },
                "max_views": {
                    "type": "integer",
                    "minimum": 0,
                    "maximum": 10000,
                    "default": 100,
                    "description": "Posts with at least this many views are excluded"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 50,
                    "default": 20,
                    "description": "Maximum number of posts to return"
                }
            },
            "additionalProperties": false
        })
    }

    fn output_schema(&self) -> Value {
        post_rows_schema(json!({
            "views": { "type": "integer", "minimum": 0 },
            "word_count": { "type": "integer", "minimum": 0 }
        }))
    }

    async fn execute(&self, input: Value, ctx: &InsightsContext) -> Result<Value, AbilityError> {
        let input: UnderperformingInput = parse_input(input)?;
        to_output(&underperforming_posts(ctx, &input).await?)
    }
}
