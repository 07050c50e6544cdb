//! `serde_json` value reader
//!
//! Lets a parsed `serde_json::Value` object act as a mapping source. Integers
//! that fit in `i64` become `Int`, every other number becomes `Float`.

use std::any::{Any, TypeId};

use modelmap_core::{Value, ValueReader};

/// Reads members of `serde_json::Value` objects
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonValueReader;

impl JsonValueReader {
    /// Create a reader
    pub fn new() -> Self {
        JsonValueReader
    }
}

impl ValueReader for JsonValueReader {
    fn supports(&self, source_type: TypeId) -> bool {
        source_type == TypeId::of::<serde_json::Value>()
    }

    fn member_names(&self, source: &dyn Any) -> Vec<String> {
        match source.downcast_ref::<serde_json::Value>() {
            Some(serde_json::Value::Object(members)) => members.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    fn get(&self, source: &dyn Any, member: &str) -> Option<Value> {
        source
            .downcast_ref::<serde_json::Value>()
            .and_then(|v| v.get(member))
            .map(json_to_value)
    }

    fn name(&self) -> &str {
        "json"
    }
}

/// Convert a JSON tree into a value tree
pub fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => Value::from(i),
            (None, Some(u)) => Value::from(u),
            (None, None) => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::List(items.iter().map(json_to_value).collect()),
        serde_json::Value::Object(members) => Value::Object(
            members
                .iter()
                .map(|(k, v)| (k.clone(), json_to_value(v)))
                .collect(),
        ),
    }
}
