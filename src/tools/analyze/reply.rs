//! Decoding the model's reply text into the fixed result fields.
//!
//! The reply is parsed into a loose `serde_json` object first and each
//! expected key is then pulled out with an explicit default. Missing keys
//! never fail; syntactically invalid JSON always does.

use serde_json::{Map, Value};

use crate::core::error::AnalysisError;

pub type JsonObject = Map<String, Value>;

/// Parse reply text into a JSON object.
pub fn parse_object(content: &str) -> Result<JsonObject, AnalysisError> {
    let value: Value = serde_json::from_str(content)?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(AnalysisError::Decode(format!(
            "expected a JSON object, got {}",
            type_name(&other)
        ))),
    }
}

/// String field with `""` for an absent key. `null` is not a string.
pub fn string_field(obj: &JsonObject, key: &str) -> Result<String, AnalysisError> {
    match obj.get(key) {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(AnalysisError::Decode(format!(
            "field `{key}` must be a string, got {}",
            type_name(other)
        ))),
    }
}

/// Nested object with an empty object for an absent key.
pub fn object_field(obj: &JsonObject, key: &str) -> Result<JsonObject, AnalysisError> {
    match obj.get(key) {
        None => Ok(JsonObject::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(other) => Err(AnalysisError::Decode(format!(
            "field `{key}` must be an object, got {}",
            type_name(other)
        ))),
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
