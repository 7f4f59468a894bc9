//! Minimal JSON-schema checking for tool inputs and outputs.
//!
//! Supports the subset the farm tools declare: `type`, `properties`,
//! `required`, `items`, `enum`, `anyOf`, `minimum` and `maximum`.

use serde_json::Value;

pub fn validate(value: &Value, schema: &Value) -> Result<(), String> {
  check(value, schema, "$")
}

fn check(value: &Value, schema: &Value, path: &str) -> Result<(), String> {
  if let Some(options) = schema.get("anyOf").and_then(Value::as_array) {
    if options.iter().any(|option| check(value, option, path).is_ok()) {
      return Ok(());
    }
    return Err(format!("{path}: matches none of the allowed shapes"));
  }

  if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
    if !allowed.contains(value) {
      return Err(format!("{path}: {value} is not one of {}", Value::Array(allowed.clone())));
    }
  }

  if let Some(kind) = schema.get("type").and_then(Value::as_str) {
    if !type_matches(value, kind) {
      return Err(format!("{path}: expected {kind}, got {}", type_name(value)));
    }
  }

  if let Some(n) = value.as_f64() {
    if let Some(min) = schema.get("minimum").and_then(Value::as_f64) {
      if n < min {
        return Err(format!("{path}: {n} is below minimum {min}"));
      }
    }
    if let Some(max) = schema.get("maximum").and_then(Value::as_f64) {
      if n > max {
        return Err(format!("{path}: {n} is above maximum {max}"));
      }
    }
  }

  if let Some(obj) = value.as_object() {
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
      for name in required.iter().filter_map(Value::as_str) {
        if !obj.contains_key(name) {
          return Err(format!("{path}: missing required field '{name}'"));
        }
      }
    }
    if let Some(props) = schema.get("properties").and_then(Value::as_object) {
      for (name, prop_schema) in props {
        if let Some(field) = obj.get(name) {
          check(field, prop_schema, &format!("{path}.{name}"))?;
        }
      }
    }
  }

  if let (Some(items), Some(item_schema)) = (value.as_array(), schema.get("items")) {
    for (idx, item) in items.iter().enumerate() {
      check(item, item_schema, &format!("{path}[{idx}]"))?;
    }
  }

  Ok(())
}

fn type_matches(value: &Value, kind: &str) -> bool {
  match kind {
    "object" => value.is_object(),
    "array" => value.is_array(),
    "string" => value.is_string(),
    "number" => value.is_number(),
    "integer" => value.is_i64() || value.is_u64(),
    "boolean" => value.is_boolean(),
    "null" => value.is_null(),
    _ => true,
  }
}

fn type_name(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}
