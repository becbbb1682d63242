//! `insights abilities` and `insights call`: local access to the registry.

use anyhow::Result;
use serde_json::{Map, Value};

use crate::auth::Caller;
use crate::config::Config;
use crate::context::InsightsContext;
use crate::traits::AbilityRegistry;

/// Build an input object from `--param key=value` pairs.
///
/// Values are parsed as JSON first (so `limit=5` is an integer) and fall
/// back to plain strings.
pub fn params_to_input(params: &[(String, String)]) -> Value {
    let mut input = Map::new();
    for (k, v) in params {
        let value = serde_json::from_str::<Value>(v).unwrap_or_else(|_| Value::String(v.clone()));
        input.insert(k.clone(), value);
    }
    Value::Object(input)
}

/// Accept either a full ability name or just the operation part.
pub fn qualify_name(name: &str) -> String {
    if name.contains('/') {
        name.to_string()
    } else {
        format!("{}/{}", crate::traits::NAMESPACE, name)
    }
}

pub fn list_abilities(config: &Config) -> Result<()> {
    let registry = AbilityRegistry::with_builtins(&config.auth.capability);

    println!(
        "{:<46} {:<28} {:<10} CAPABILITY",
        "ABILITY", "LABEL", "CATEGORY"
    );
    for r in registry.registrations() {
        let ability = r.ability();
        println!(
            "{:<46} {:<28} {:<10} {}",
            ability.name(),
            ability.label(),
            ability.category(),
            r.capability()
        );
    }
    Ok(())
}

/// Run an ability as the local operator and print its JSON result.
pub async fn run_call(config: &Config, name: &str, params: &[(String, String)]) -> Result<()> {
    let ctx = InsightsContext::from_config(config).await?;
    let registry = AbilityRegistry::with_builtins(&config.auth.capability);
    let input = params_to_input(params);

    let result = registry
        .invoke(&qualify_name(name), Some(&input), &Caller::privileged("cli"), &ctx)
        .await
        .map_err(|e| anyhow::anyhow!("{} ({})", e, e.code()))?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
