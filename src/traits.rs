//! The ability trait and registry.
//!
//! An [`Ability`] is a named, schema-typed, read-only operation. The
//! [`AbilityRegistry`] pairs each ability with the capability it requires
//! and a permission predicate, validates input against the published
//! schema and runs the handler.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                AbilityRegistry               │
//! │  ┌──────────┐ ┌──────────┐ ┌──────────────┐  │
//! │  │top-posts │ │ search-  │ │ stale-drafts │  │
//! │  │          │ │  terms   │ │ underperf.   │  │
//! │  └──────────┘ └──────────┘ └──────────────┘  │
//! └──────────────┬───────────────────────────────┘
//!                ▼
//!   invoke() → validate → permission → execute
//!                ▲
//!   HTTP  POST /abilities/{namespace}/{name}
//!   MCP   tools/call
//!   CLI   insights call
//! ```

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::Instrument;

use crate::abilities::{
    GetSearchTerms, GetStaleDrafts, GetTopPosts, GetUnderperformingPosts,
};
use crate::auth::{caller_can, Caller};
use crate::context::InsightsContext;
use crate::error::AbilityError;
use crate::schema::validate_input;

/// Namespace prefixed to every built-in ability name.
pub const NAMESPACE: &str = "editorial-insights";

/// Category all built-in abilities are filed under.
pub const CONTENT_CATEGORY: &str = "content";

// ═══════════════════════════════════════════════════════════════════════
// Ability Trait
// ═══════════════════════════════════════════════════════════════════════

/// A read-only operation callers can discover and invoke.
#[async_trait]
pub trait Ability: Send + Sync {
    /// Fully-qualified name, `"{namespace}/{operation}"`.
    fn name(&self) -> &str;

    /// Short human-readable title.
    fn label(&self) -> &str;

    fn description(&self) -> &str;

    fn category(&self) -> &str {
        CONTENT_CATEGORY
    }

    /// JSON Schema for the input object. Defaults declared here are
    /// injected before [`execute`](Ability::execute) runs.
    fn input_schema(&self) -> Value;

    fn output_schema(&self) -> Value;

    /// Run with input that has already passed schema validation.
    async fn execute(&self, input: Value, ctx: &InsightsContext) -> Result<Value, AbilityError>;
}

// ═══════════════════════════════════════════════════════════════════════
// Registrations
// ═══════════════════════════════════════════════════════════════════════

/// Decides whether a caller may run an ability requiring `capability`.
pub type PermissionCheck = fn(&Caller, &str) -> bool;

pub struct Registration {
    ability: Box<dyn Ability>,
    capability: String,
    permission: PermissionCheck,
}

impl Registration {
    pub fn ability(&self) -> &dyn Ability {
        self.ability.as_ref()
    }

    pub fn capability(&self) -> &str {
        &self.capability
    }

    pub fn permits(&self, caller: &Caller) -> bool {
        (self.permission)(caller, &self.capability)
    }

    pub fn describe(&self) -> AbilityInfo {
        let ability = self.ability();
        AbilityInfo {
            name: ability.name().to_string(),
            label: ability.label().to_string(),
            description: ability.description().to_string(),
            category: ability.category().to_string(),
            capability: self.capability.clone(),
            input_schema: ability.input_schema(),
            output_schema: ability.output_schema(),
            readonly: true,
        }
    }
}

/// Public description of a registered ability, as listed to callers.
#[derive(Debug, Clone, Serialize)]
pub struct AbilityInfo {
    pub name: String,
    pub label: String,
    pub description: String,
    pub category: String,
    pub capability: String,
    pub input_schema: Value,
    pub output_schema: Value,
    pub readonly: bool,
}

// ═══════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════

pub struct AbilityRegistry {
    registrations: Vec<Registration>,
}

impl AbilityRegistry {
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
        }
    }

    /// Registry holding the four built-in abilities, each gated on
    /// `capability` through [`caller_can`].
    pub fn with_builtins(capability: &str) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(GetTopPosts), capability, caller_can);
        registry.register(Box::new(GetSearchTerms), capability, caller_can);
        registry.register(Box::new(GetStaleDrafts), capability, caller_can);
        registry.register(Box::new(GetUnderperformingPosts), capability, caller_can);
        registry
    }

    pub fn register(
        &mut self,
        ability: Box<dyn Ability>,
        capability: &str,
        permission: PermissionCheck,
    ) {
        self.registrations.push(Registration {
            ability,
            capability: capability.to_string(),
            permission,
        });
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn find(&self, name: &str) -> Option<&Registration> {
        self.registrations
            .iter()
            .find(|r| r.ability.name() == name)
    }

    /// Distinct categories, in registration order.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for r in &self.registrations {
            let category = r.ability.category();
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        categories
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Validate, permission-check and run the ability called `name`.
    pub async fn invoke(
        &self,
        name: &str,
        input: Option<&Value>,
        caller: &Caller,
        ctx: &InsightsContext,
    ) -> Result<Value, AbilityError> {
        let registration = self
            .find(name)
            .ok_or_else(|| AbilityError::NotFound(name.to_string()))?;

        let span = tracing::info_span!(
            "ability",
            name = %name,
            invocation = %uuid::Uuid::new_v4(),
            caller = %caller.name,
        );

        async move {
            let ability = registration.ability();
            let input = validate_input(&ability.input_schema(), input)
                .map_err(|e| AbilityError::InvalidInput(e.to_string()))?;

            if !registration.permits(caller) {
                tracing::info!(capability = registration.capability(), "permission denied");
                return Err(AbilityError::Forbidden(registration.capability().to_string()));
            }

            tracing::info!(input = %input, "invoking ability");
            match ability.execute(input, ctx).await {
                Ok(output) => {
                    let rows = output.as_array().map(Vec::len).unwrap_or(0);
                    tracing::info!(rows, "ability completed");
                    Ok(output)
                }
                Err(e) => {
                    match &e {
                        AbilityError::Backend(_) | AbilityError::Storage(_) => {
                            tracing::error!(code = e.code(), error = %e, "ability failed")
                        }
                        _ => tracing::info!(code = e.code(), "ability refused"),
                    }
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }
}

impl Default for AbilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let registry = AbilityRegistry::with_builtins("edit_posts");
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.categories(), vec![CONTENT_CATEGORY]);
        for name in [
            "editorial-insights/get-top-posts",
            "editorial-insights/get-search-terms",
            "editorial-insights/get-stale-drafts",
            "editorial-insights/get-underperforming-posts",
        ] {
            let reg = registry.find(name).expect(name);
            assert_eq!(reg.capability(), "edit_posts");
            let info = reg.describe();
            assert_eq!(info.input_schema["type"], "object");
            assert_eq!(info.output_schema["type"], "array");
            assert!(info.readonly);
        }
    }

    #[test]
    fn test_permission_uses_shared_predicate() {
        let registry = AbilityRegistry::with_builtins("edit_posts");
        let editor = Caller::with_capabilities("ed", ["edit_posts"]);
        let reader = Caller::with_capabilities("rd", ["read"]);
        for reg in registry.registrations() {
            assert!(reg.permits(&editor));
            assert!(!reg.permits(&reader));
            assert!(!reg.permits(&Caller::anonymous()));
        }
    }
}
