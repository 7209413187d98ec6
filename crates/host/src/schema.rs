//! Argument validation against a tool's declared JSON Schema.
//!
//! Covers the subset the tool catalog actually uses: object shape,
//! required fields, and primitive property types. Properties the schema
//! does not declare pass through untouched.

use serde_json::Value;

/// Validate `arguments` against `schema`. Returns the first violation as
/// a human-readable message.
pub fn validate(schema: &Value, arguments: &Value) -> Result<(), String> {
    if schema.get("type").and_then(Value::as_str) != Some("object") {
        return Ok(());
    }

    // Callers may omit the params object entirely when nothing is required.
    let empty = serde_json::Map::new();
    let args = match arguments {
        Value::Object(map) => map,
        Value::Null => &empty,
        other => {
            return Err(format!(
                "arguments must be an object, got {}",
                type_name(other)
            ));
        }
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            if !args.contains_key(field) {
                return Err(format!("missing required field '{field}'"));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (name, prop_schema) in properties {
            let Some(value) = args.get(name) else { continue };
            let Some(expected) = prop_schema.get("type").and_then(Value::as_str) else {
                continue;
            };
            if !matches_type(value, expected) {
                return Err(format!(
                    "field '{name}' must be {}, got {}",
                    article(expected),
                    type_name(value)
                ));
            }
        }
    }

    Ok(())
}

fn matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        // Unknown type keyword: do not reject what we cannot check.
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn article(expected: &str) -> String {
    match expected {
        "integer" | "object" | "array" => format!("an {expected}"),
        _ => format!("a {expected}"),
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
                "query": { "type": "string" },
                "max_results": { "type": "integer" }
            },
            "required": ["query"]
        })
    }

    #[test]
    fn accepts_valid_arguments() {
        assert!(validate(&schema(), &json!({"query": "hi", "max_results": 3})).is_ok());
        assert!(validate(&schema(), &json!({"query": "hi"})).is_ok());
    }

    #[test]
    fn rejects_missing_required_field() {
        let err = validate(&schema(), &json!({"max_results": 3})).unwrap_err();
        assert!(err.contains("query"));
    }

    #[test]
    fn rejects_wrong_primitive_type() {
        let err = validate(&schema(), &json!({"query": 17})).unwrap_err();
        assert!(err.contains("'query'"));
        assert!(err.contains("string"));

        let err = validate(&schema(), &json!({"query": "hi", "max_results": "three"})).unwrap_err();
        assert!(err.contains("'max_results'"));
    }

    #[test]
    fn float_is_not_an_integer() {
        let err = validate(&schema(), &json!({"query": "hi", "max_results": 2.5})).unwrap_err();
        assert!(err.contains("'max_results'"));
    }

    #[test]
    fn rejects_non_object_arguments() {
        let err = validate(&schema(), &json!([1, 2, 3])).unwrap_err();
        assert!(err.contains("must be an object"));
    }

    #[test]
    fn null_arguments_pass_when_nothing_required() {
        let no_required = json!({
            "type": "object",
            "properties": {}
        });
        assert!(validate(&no_required, &Value::Null).is_ok());
        assert!(validate(&schema(), &Value::Null).is_err());
    }

    #[test]
    fn undeclared_fields_pass_through() {
        assert!(validate(&schema(), &json!({"query": "hi", "extra": true})).is_ok());
    }
}
