//! Input validation against ability schemas.
//!
//! Covers the JSON Schema subset the abilities publish: `type`, `enum`,
//! `minimum`, `maximum`, `required`, `default` and
//! `additionalProperties: false`. Anything else in a schema is ignored.

use anyhow::{bail, Result};
use serde_json::{Map, Value};

/// Validate `input` against an object schema and inject defaults.
///
/// Absent input is treated as `{}`; any other non-object input is rejected.
/// Returns the validated object with defaults filled in for omitted
/// properties.
pub fn validate_input(schema: &Value, input: Option<&Value>) -> Result<Value> {
    let params = match input {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(other) => bail!("input must be an object, got {}", json_type_name(other)),
    };

    let properties = schema
        .get("properties")
        .and_then(|p| p.as_object())
        .cloned()
        .unwrap_or_default();

    if schema.get("additionalProperties") == Some(&Value::Bool(false)) {
        if let Some(unknown) = params.keys().find(|k| !properties.contains_key(*k)) {
            bail!("unknown parameter: {}", unknown);
        }
    }

    let required = schema
        .get("required")
        .and_then(|r| r.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect::<Vec<_>>())
        .unwrap_or_default();
    for field in required {
        if !params.contains_key(field) {
            bail!("missing required parameter: {}", field);
        }
    }

    let mut result = params.clone();

    for (name, prop_schema) in &properties {
        match params.get(name) {
            Some(value) => check_value(name, prop_schema, value)?,
            None => {
                if let Some(default) = prop_schema.get("default") {
                    result.insert(name.clone(), default.clone());
                }
            }
        }
    }

    Ok(Value::Object(result))
}

fn check_value(name: &str, schema: &Value, value: &Value) -> Result<()> {
    if let Some(expected_type) = schema.get("type").and_then(|t| t.as_str()) {
        let type_ok = match expected_type {
            "string" => value.is_string(),
            "integer" => value.is_i64() || value.is_u64(),
            "number" => value.is_number(),
            "boolean" => value.is_boolean(),
            "array" => value.is_array(),
            "object" => value.is_object(),
            _ => true,
        };
        if !type_ok {
            bail!(
                "parameter '{}' must be of type '{}', got {}",
                name,
                expected_type,
                json_type_name(value)
            );
        }
    }

    if let Some(enum_values) = schema.get("enum").and_then(|e| e.as_array()) {
        if !enum_values.contains(value) {
            let allowed: Vec<String> = enum_values.iter().map(|v| v.to_string()).collect();
            bail!(
                "parameter '{}' must be one of [{}], got {}",
                name,
                allowed.join(", "),
                value
            );
        }
    }

    if let Some(n) = value.as_f64() {
        if let Some(min) = schema.get("minimum").and_then(Value::as_f64) {
            if n < min {
                bail!("parameter '{}' must be >= {}, got {}", name, min, value);
            }
        }
        if let Some(max) = schema.get("maximum").and_then(Value::as_f64) {
            if n > max {
                bail!("parameter '{}' must be <= {}, got {}", name, max, value);
            }
        }
    }

    Ok(())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "days": { "type": "integer", "enum": [7, 30, 90], "default": 30 },
                "limit": { "type": "integer", "minimum": 1, "maximum": 50, "default": 10 }
            },
            "additionalProperties": false
        })
    }

    #[test]
    fn test_defaults_injected_for_absent_input() {
        let out = validate_input(&schema(), None).unwrap();
        assert_eq!(out, json!({ "days": 30, "limit": 10 }));
    }

    #[test]
    fn test_explicit_values_kept() {
        let out = validate_input(&schema(), Some(&json!({ "days": 7 }))).unwrap();
        assert_eq!(out, json!({ "days": 7, "limit": 10 }));
    }

    #[test]
    fn test_enum_violation() {
        let err = validate_input(&schema(), Some(&json!({ "days": 14 }))).unwrap_err();
        assert!(err.to_string().contains("must be one of"), "{}", err);
    }

    #[test]
    fn test_range_violation() {
        assert!(validate_input(&schema(), Some(&json!({ "limit": 0 }))).is_err());
        assert!(validate_input(&schema(), Some(&json!({ "limit": 51 }))).is_err());
        assert!(validate_input(&schema(), Some(&json!({ "limit": 50 }))).is_ok());
    }

    #[test]
    fn test_type_violation() {
        let err = validate_input(&schema(), Some(&json!({ "limit": "5" }))).unwrap_err();
        assert!(err.to_string().contains("type 'integer'"));
        assert!(validate_input(&schema(), Some(&json!({ "limit": 5.5 }))).is_err());
    }

    #[test]
    fn test_unknown_and_non_object_rejected() {
        assert!(validate_input(&schema(), Some(&json!({ "offset": 1 }))).is_err());
        assert!(validate_input(&schema(), Some(&json!([1, 2]))).is_err());
    }

    #[test]
    fn test_required_field() {
        let schema = json!({
            "type": "object",
            "properties": { "id": { "type": "integer" } },
            "required": ["id"]
        });
        assert!(validate_input(&schema, Some(&json!({}))).is_err());
    }
}
