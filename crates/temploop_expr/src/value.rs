//! Helpers over the `serde_json::Value` template tree.

use std::collections::HashMap;

use serde_json::Value;

/// Flat name to value map that reference functions resolve against.
pub type Scope = HashMap<String, Value>;

/// Look up a name, treating an explicit null as undefined.
pub fn lookup<'s>(scope: &'s Scope, name: &str) -> Option<&'s Value> {
    scope.get(name).filter(|value| !value.is_null())
}

/// Render a scalar as the text it contributes to a string.
///
/// Returns `None` for null, sequences and mappings.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Human-readable name of a value's shape, used in error messages.
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
