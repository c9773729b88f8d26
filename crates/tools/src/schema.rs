//! Argument Validation
//!
//! Checks a model-supplied argument object against the `ParameterSchema` a
//! tool declared, before the tool ever sees it. Only the schema subset tools
//! here actually declare is understood: typed properties, `required`,
//! string `enum`, array `items`, and nested objects.

use serde_json::{Map, Value};

use course_assistant_llm::ParameterSchema;

/// Validate `args` against a tool's top-level object schema.
///
/// Returns a message naming the offending key on failure.
pub fn validate_arguments(schema: &ParameterSchema, args: &Value) -> Result<(), String> {
    let object = args
        .as_object()
        .ok_or_else(|| format!("expected a JSON object, got {}", type_name(args)))?;
    validate_object(schema, object, "")
}

fn validate_object(
    schema: &ParameterSchema,
    object: &Map<String, Value>,
    path: &str,
) -> Result<(), String> {
    if let Some(required) = &schema.required {
        for key in required {
            match object.get(key) {
                None | Some(Value::Null) => {
                    return Err(format!("missing required '{}'", join(path, key)))
                }
                Some(_) => {}
            }
        }
    }

    let properties = schema.properties.as_ref();
    for (key, value) in object {
        let Some(prop) = properties.and_then(|p| p.get(key)) else {
            return Err(format!("unexpected argument '{}'", join(path, key)));
        };
        // Optional keys may be sent as null.
        if value.is_null() {
            continue;
        }
        validate_value(prop, value, &join(path, key))?;
    }
    Ok(())
}

fn validate_value(schema: &ParameterSchema, value: &Value, path: &str) -> Result<(), String> {
    let matches = match schema.schema_type.as_str() {
        "string" => value.is_string(),
        "integer" => is_integer(value),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        // Unknown types are not ours to judge.
        _ => true,
    };
    if !matches {
        return Err(format!(
            "'{}' must be {}, got {}",
            path,
            article(&schema.schema_type),
            type_name(value)
        ));
    }

    if let (Some(allowed), Some(s)) = (&schema.enum_values, value.as_str()) {
        if !allowed.iter().any(|a| a == s) {
            return Err(format!(
                "'{}' must be one of [{}], got '{}'",
                path,
                allowed.join(", "),
                s
            ));
        }
    }

    match value {
        Value::Array(items) => {
            if let Some(item_schema) = &schema.items {
                for (i, item) in items.iter().enumerate() {
                    validate_value(item_schema, item, &format!("{}[{}]", path, i))?;
                }
            }
        }
        Value::Object(object) if schema.properties.is_some() => {
            validate_object(schema, object, path)?;
        }
        _ => {}
    }
    Ok(())
}

/// Integers, including floats with no fractional part (`1.0`).
fn is_integer(value: &Value) -> bool {
    if value.is_i64() || value.is_u64() {
        return true;
    }
    value
        .as_f64()
        .map(|f| f.is_finite() && f.fract() == 0.0)
        .unwrap_or(false)
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn article(schema_type: &str) -> String {
    match schema_type {
        "integer" | "array" | "object" => format!("an {}", schema_type),
        other => format!("a {}", other),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
