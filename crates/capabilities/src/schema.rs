//! A small JSON Schema subset validator.
//!
//! Supported keywords: `type` (string or array), `const`, `enum`,
//! `required`, `properties`, `additionalProperties: false`, `items`,
//! `anyOf`, `oneOf`, `minimum`, `maximum`, `minLength`, `maxLength`,
//! `minItems`, `maxItems`. Unknown keywords are ignored.
//!
//! `integer` accepts any number without a fractional part, so `2.0` is an
//! integer.

use serde_json::{Map, Value};

/// Validate `value` against `schema`. Errors name the failing path (`$.a.b[0]`).
pub fn validate(value: &Value, schema: &Value) -> Result<(), String> {
    validate_at(value, schema, "$")
}

/// Reject schemas that cannot be used at all.
pub(crate) fn check_schema(schema: &Value) -> Result<(), String> {
    let obj = schema
        .as_object()
        .ok_or_else(|| "schema must be a JSON object".to_string())?;
    if let Some(t) = obj.get("type")
        && !(t.is_string() || t.is_array())
    {
        return Err("schema.type must be a string or an array".into());
    }
    Ok(())
}

fn validate_at(value: &Value, schema: &Value, path: &str) -> Result<(), String> {
    let schema_obj = schema
        .as_object()
        .ok_or_else(|| format!("schema at '{path}' must be an object"))?;

    if let Some(type_spec) = schema_obj.get("type") {
        validate_type(value, type_spec, path)?;
    }

    if let Some(constant) = schema_obj.get("const")
        && value != constant
    {
        return Err(format!("{path} expected const {constant}"));
    }

    if let Some(variants) = schema_obj.get("enum").and_then(|v| v.as_array())
        && !variants.iter().any(|candidate| candidate == value)
    {
        return Err(format!("{path} is not one of the allowed enum values"));
    }

    if let Some(branches) = schema_obj.get("anyOf").and_then(|v| v.as_array())
        && !branches.iter().any(|b| validate_at(value, b, path).is_ok())
    {
        return Err(format!("{path} did not match any anyOf branch"));
    }

    if let Some(branches) = schema_obj.get("oneOf").and_then(|v| v.as_array()) {
        let matched = branches
            .iter()
            .filter(|b| validate_at(value, b, path).is_ok())
            .count();
        if matched != 1 {
            return Err(format!("{path} matched {matched} oneOf branches, expected exactly 1"));
        }
    }

    validate_bounds(value, schema_obj, path)?;

    // Object keywords only apply to objects; `type` already rejected the rest.
    if let Some(object) = value.as_object() {
        validate_object(object, schema_obj, path)?;
    } else if !schema_obj.contains_key("type")
        && (schema_obj.contains_key("required") || schema_obj.contains_key("properties"))
    {
        return Err(format!("{path} must be an object"));
    }

    if let Some(item_schema) = schema_obj.get("items")
        && let Some(array) = value.as_array()
    {
        for (idx, item) in array.iter().enumerate() {
            validate_at(item, item_schema, &format!("{path}[{idx}]"))?;
        }
    }

    Ok(())
}

fn validate_object(object: &Map<String, Value>, schema_obj: &Map<String, Value>, path: &str) -> Result<(), String> {
    if let Some(required) = schema_obj.get("required").and_then(|v| v.as_array()) {
        for key in required.iter().filter_map(|v| v.as_str()) {
            if !object.contains_key(key) {
                return Err(format!("{path} missing required field '{key}'"));
            }
        }
    }

    let Some(properties) = schema_obj.get("properties").and_then(|v| v.as_object()) else {
        return Ok(());
    };

    for (key, property_schema) in properties {
        if let Some(child) = object.get(key) {
            validate_at(child, property_schema, &format!("{path}.{key}"))?;
        }
    }

    if schema_obj.get("additionalProperties").and_then(|v| v.as_bool()) == Some(false) {
        for key in object.keys() {
            if !properties.contains_key(key) {
                return Err(format!("{path} contains unknown field '{key}'"));
            }
        }
    }

    Ok(())
}

/// Numeric range, string length (in chars) and array length keywords.
/// Each applies only to values of its own type.
fn validate_bounds(value: &Value, schema_obj: &Map<String, Value>, path: &str) -> Result<(), String> {
    let bound = |key: &str| schema_obj.get(key).and_then(Value::as_f64);

    if let Some(n) = value.as_f64() {
        if let Some(min) = bound("minimum")
            && n < min
        {
            return Err(format!("{path} must be >= {min}"));
        }
        if let Some(max) = bound("maximum")
            && n > max
        {
            return Err(format!("{path} must be <= {max}"));
        }
    }

    let length = match value {
        Value::String(s) => Some((s.chars().count(), "minLength", "maxLength", "characters")),
        Value::Array(items) => Some((items.len(), "minItems", "maxItems", "items")),
        _ => None,
    };
    if let Some((len, min_key, max_key, unit)) = length {
        let len = len as f64;
        if let Some(min) = bound(min_key)
            && len < min
        {
            return Err(format!("{path} must have at least {min} {unit}"));
        }
        if let Some(max) = bound(max_key)
            && len > max
        {
            return Err(format!("{path} must have at most {max} {unit}"));
        }
    }

    Ok(())
}

fn validate_type(value: &Value, type_spec: &Value, path: &str) -> Result<(), String> {
    let matches = |t: &str| match t {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => {
            value.as_i64().is_some() || value.as_u64().is_some() || value.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        _ => false,
    };

    match type_spec {
        Value::String(name) if matches(name) => Ok(()),
        Value::String(name) => Err(format!("{path} expected type '{name}'")),
        Value::Array(types) if types.iter().filter_map(|t| t.as_str()).any(matches) => Ok(()),
        Value::Array(_) => Err(format!("{path} did not match any allowed types")),
        _ => Err(format!("{path} schema.type must be string or array")),
    }
}

/// Wire form of a schema for strict tool-calling APIs: every
/// `additionalProperties` marker and the `$schema` key removed, recursively.
pub fn strip_additional_properties(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(k, _)| k.as_str() != "additionalProperties" && k.as_str() != "$schema")
                .map(|(k, v)| (k.clone(), strip_additional_properties(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(strip_additional_properties).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scene_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "sceneId": { "type": "string" },
                "panelCount": { "type": "integer" },
                "mood": { "enum": ["calm", "tense"] },
                "tags": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["sceneId"],
            "additionalProperties": false
        })
    }

    #[test]
    fn accepts_valid_value() {
        let value = json!({"sceneId": "s-1", "panelCount": 3, "mood": "calm", "tags": ["night"]});
        assert!(validate(&value, &scene_schema()).is_ok());
    }

    #[test]
    fn reports_missing_required_field() {
        let err = validate(&json!({}), &scene_schema()).unwrap_err();
        assert!(err.contains("missing required field 'sceneId'"), "{err}");
    }

    #[test]
    fn reports_nested_path() {
        let err = validate(&json!({"sceneId": "s", "tags": ["a", 2]}), &scene_schema()).unwrap_err();
        assert!(err.starts_with("$.tags[1]"), "{err}");
    }

    #[test]
    fn rejects_unknown_fields_when_closed() {
        let err = validate(&json!({"sceneId": "s", "extra": 1}), &scene_schema()).unwrap_err();
        assert!(err.contains("unknown field 'extra'"));
    }

    #[test]
    fn any_of_and_nullable_types() {
        let schema = json!({"anyOf": [{"type": "string"}, {"type": "null"}]});
        assert!(validate(&json!(null), &schema).is_ok());
        assert!(validate(&json!(1), &schema).is_err());

        let schema = json!({"type": ["string", "null"]});
        assert!(validate(&json!("x"), &schema).is_ok());
    }

    #[test]
    fn integer_rejects_fractions() {
        assert!(validate(&json!(1.5), &json!({"type": "integer"})).is_err());
        assert!(validate(&json!(2), &json!({"type": "number"})).is_ok());
    }

    #[test]
    fn integral_floats_count_as_integers() {
        let schema = json!({"type": "integer"});
        assert!(validate(&json!(2.0), &schema).is_ok());
        assert!(validate(&json!(-4.0), &schema).is_ok());
        assert!(validate(&json!(2.5), &schema).is_err());
    }

    #[test]
    fn numeric_bounds() {
        let schema = json!({"type": "integer", "minimum": 1, "maximum": 12});
        assert!(validate(&json!(1), &schema).is_ok());
        assert!(validate(&json!(12), &schema).is_ok());
        let err = validate(&json!({"order": 0}), &json!({"properties": {"order": schema.clone()}})).unwrap_err();
        assert!(err.starts_with("$.order must be >= 1"), "{err}");
        assert!(validate(&json!(13), &schema).is_err());
        // Bounds ignore values of other types.
        assert!(validate(&json!("0"), &json!({"minimum": 1})).is_ok());
    }

    #[test]
    fn length_bounds() {
        let schema = json!({"type": "string", "minLength": 1, "maxLength": 3});
        assert!(validate(&json!(""), &schema).is_err());
        assert!(validate(&json!("ドン!"), &schema).is_ok());
        assert!(validate(&json!("ドドドン"), &schema).is_err());

        let schema = json!({"type": "array", "minItems": 1, "maxItems": 2});
        assert!(validate(&json!([]), &schema).unwrap_err().contains("at least 1 items"));
        assert!(validate(&json!(["a", "b"]), &schema).is_ok());
        assert!(validate(&json!(["a", "b", "c"]), &schema).is_err());
    }

    #[test]
    fn strips_markers_recursively() {
        let stripped = strip_additional_properties(&json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "inner": { "type": "object", "additionalProperties": false },
                "list": { "type": "array", "items": { "type": "object", "additionalProperties": true } }
            }
        }));
        let text = stripped.to_string();
        assert!(!text.contains("additionalProperties"));
        assert!(!text.contains("$schema"));
        assert_eq!(stripped["properties"]["inner"]["type"], "object");
    }

    #[test]
    fn check_schema_rejects_non_objects() {
        assert!(check_schema(&json!("object")).is_err());
        assert!(check_schema(&json!({"type": 5})).is_err());
        assert!(check_schema(&json!({"type": "object"})).is_ok());
    }
}
