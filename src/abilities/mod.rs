//! The four built-in abilities.
//!
//! Each submodule exposes a unit struct implementing
//! [`Ability`](crate::traits::Ability), a typed input struct and a free
//! function that does the work, so the logic can be called directly
//! without going through JSON.

pub mod search_terms;
pub mod stale_drafts;
pub mod top_posts;
pub mod underperforming;

pub use search_terms::{search_terms, GetSearchTerms, SearchTermsInput};
pub use stale_drafts::{stale_drafts, GetStaleDrafts, StaleDraftsInput};
pub use top_posts::{top_posts, GetTopPosts, TopPostsInput};
pub use underperforming::{underperforming_posts, GetUnderperformingPosts, UnderperformingInput};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::AbilityError;

/// JSON Schema properties shared by every post-shaped output row.
fn post_summary_properties() -> Map<String, Value> {
    let props = json!({
        "post_id": { "type": "integer", "description": "Post ID" },
        "title": { "type": "string", "description": "Post title" },
        "url": { "type": "string", "description": "Permalink" },
        "date_published": { "type": "string", "format": "date-time", "description": "Publish time (UTC)" },
        "categories": { "type": "array", "items": { "type": "string" }, "description": "Category names" }
    });
    match props {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Output schema for an array of post rows with `extra` properties added.
fn post_rows_schema(extra: Value) -> Value {
    let mut properties = post_summary_properties();
    if let Value::Object(extra) = extra {
        properties.extend(extra);
    }
    json!({
        "type": "array",
        "items": { "type": "object", "properties": properties }
    })
}

fn parse_input<T: DeserializeOwned>(input: Value) -> Result<T, AbilityError> {
    serde_json::from_value(input).map_err(|e| AbilityError::InvalidInput(e.to_string()))
}

fn to_output<T: Serialize>(rows: &T) -> Result<Value, AbilityError> {
    serde_json::to_value(rows).map_err(|e| AbilityError::Storage(e.into()))
}
