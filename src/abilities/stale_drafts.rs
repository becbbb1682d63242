//! `editorial-insights/get-stale-drafts`: drafts nobody has touched in a
//! while. Reads only the content store and is never cached, so
//! `days_since_modified` is always current.

use async_trait::async_trait;
use chrono::Duration;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_input, to_output};
use crate::content::{DateColumn, DateFilter, PostQuery, SortOrder};
use crate::context::InsightsContext;
use crate::error::AbilityError;
use crate::models::{PostStatus, StaleDraft};
use crate::text::{excerpt, word_count, EXCERPT_LENGTH};
use crate::timestamps::{days_since, resolve};
use crate::traits::Ability;

#[derive(Debug, Clone, Deserialize)]
pub struct StaleDraftsInput {
    #[serde(default = "default_days_old")]
    pub days_old: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_days_old() -> u32 {
    180
}
fn default_limit() -> u32 {
    20
}

impl Default for StaleDraftsInput {
    fn default() -> Self {
        Self {
            days_old: default_days_old(),
            limit: default_limit(),
        }
    }
}

pub async fn stale_drafts(
    ctx: &InsightsContext,
    input: &StaleDraftsInput,
) -> Result<Vec<StaleDraft>, AbilityError> {
    let now = ctx.now();
    let cutoff = now - Duration::days(input.days_old as i64);
    let limit = input.limit as usize;

    let drafts = ctx
        .content
        .query_posts(&PostQuery {
            status: PostStatus::Draft,
            date_filter: Some(DateFilter {
                column: DateColumn::Modified,
                before: cutoff,
            }),
            order_by: DateColumn::Modified,
            order: SortOrder::Asc,
            limit,
        })
        .await?;

    let offset = ctx.content.site_offset();
    let mut out = Vec::with_capacity(drafts.len().min(limit));
    for post in drafts.into_iter().take(limit) {
        let date_created = resolve(&post.date_gmt, &post.date_local, offset, now);
        let date_modified = resolve(&post.modified_gmt, &post.modified_local, offset, now);
        let title = if post.title.trim().is_empty() {
            "Untitled".to_string()
        } else {
            post.title.clone()
        };

        out.push(StaleDraft {
            post_id: post.id,
            title,
            excerpt: excerpt(&post.content, EXCERPT_LENGTH),
            date_created,
            date_modified,
            days_since_modified: days_since(now, date_modified),
            categories: ctx.content.categories(post.id).await?,
            word_count: word_count(&post.content),
        });
    }

    Ok(out)
}

pub struct GetStaleDrafts;

#[async_trait]
impl Ability for GetStaleDrafts {
    fn name(&self) -> &str {
        "editorial-insights/get-stale-drafts"
    }

    fn label(&self) -> &str {
        "Get Stale Drafts"
    }

    fn description(&self) -> &str {
        "List drafts that have not been modified for a given number of days, oldest first, with an excerpt and word count."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "days_old": {
                    "type": "integer",
                    "minimum": 7,
                    "maximum": 730,
                    "default": 180,
                    "description": "Minimum days since the draft was last modified"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 50,
                    "default": 20,
                    "description": "Maximum number of drafts to return"
                }
            },
            "additionalProperties": false
        })
    }

    fn output_schema(&self) -> Value {
        json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "post_id": { "type": "integer" },
                    "title": { "type": "string" },
                    "excerpt": { "type": "string", "description": "Plain-text preview, at most 150 characters plus an ellipsis" },
                    "date_created": { "type": "string", "format": "date-time" },
                    "date_modified": { "type": "string", "format": "date-time" },
                    "days_since_modified": { "type": "integer", "minimum": 0 },
                    "categories": { "type": "array", "items": { "type": "string" } },
                    "word_count": { "type": "integer", "minimum": 0 }
                }
            }
        })
    }

    async fn execute(&self, input: Value, ctx: &InsightsContext) -> Result<Value, AbilityError> {
        let input: StaleDraftsInput = parse_input(input)?;
        to_output(&stale_drafts(ctx, &input).await?)
    }
}
