//! `editorial-insights/get-search-terms`: what visitors searched for.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_input, to_output};
use crate::context::InsightsContext;
use crate::error::AbilityError;
use crate::models::SearchTerm;
use crate::traits::Ability;

/// Placeholder the stats backend reports for encrypted search referrers.
pub const UNKNOWN_TERMS: &str = "Unknown Search Terms";

const HEADROOM: u32 = 2;

#[derive(Debug, Clone, Deserialize)]
pub struct SearchTermsInput {
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_days() -> u32 {
    30
}
fn default_limit() -> u32 {
    20
}

impl Default for SearchTermsInput {
    fn default() -> Self {
        Self {
            days: default_days(),
            limit: default_limit(),
        }
    }
}

pub async fn search_terms(
    ctx: &InsightsContext,
    input: &SearchTermsInput,
) -> Result<Vec<SearchTerm>, AbilityError> {
    if !ctx.analytics.is_available() {
        return Err(AbilityError::AnalyticsUnavailable);
    }

    let key = ctx.cache_settings.key(
        "search_terms",
        &[("days", input.days as i64), ("limit", input.limit as i64)],
    );
    if let Some(hit) = ctx.cached::<Vec<SearchTerm>>(&key).await? {
        return Ok(hit);
    }

    let rows = ctx
        .analytics
        .search_terms(input.days, input.limit.saturating_mul(HEADROOM))
        .await
        .map_err(AbilityError::backend)?;

    let terms: Vec<SearchTerm> = rows
        .into_iter()
        .filter(|row| !row.term.trim().is_empty() && row.term != UNKNOWN_TERMS)
        .take(input.limit as usize)
        .map(|row| SearchTerm {
            term: row.term,
            count: row.views,
        })
        .collect();

    ctx.remember(&key, &terms).await?;
    Ok(terms)
}

pub struct GetSearchTerms;

#[async_trait]
impl Ability for GetSearchTerms {
    fn name(&self) -> &str {
        "editorial-insights/get-search-terms"
    }

    fn label(&self) -> &str {
        "Get Search Terms"
    }

    fn description(&self) -> &str {
        "List the search terms visitors used to find the site, most frequent first."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "days": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 365,
                    "default": 30,
                    "description": "Reporting period in days"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 100,
                    "default": 20,
                    "description": "Maximum number of terms to return"
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
                    "term": { "type": "string", "description": "Search term" },
                    "count": { "type": "integer", "minimum": 0, "description": "Times searched in the period" }
                }
            }
        })
    }

    async fn execute(&self, input: Value, ctx: &InsightsContext) -> Result<Value, AbilityError> {
        let input: SearchTermsInput = parse_input(input)?;
        to_output(&search_terms(ctx, &input).await?)
    }
}
