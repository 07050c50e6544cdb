//! Value types for modelmap
//!
//! This module defines:
//! - Value: the runtime representation every mapped instance passes through
//!
//! ## Value Model
//!
//! Every source instance is read into a `Value` tree, mapping plans are
//! executed against those trees, and the destination tree is turned back
//! into the destination type. The model has eight variants:
//! - Null, Bool, Int, Float, String, List, Map, Object
//!
//! ### Type Rules
//!
//! - `Int(1) != Float(1.0)`: different variants are never equal
//! - `Int` holds every `i64` and `u64` value; narrowing to a member's own
//!   integer type is checked when the value is read back
//! - Enumerations travel as `String` holding the variant name
//! - `Map` keeps insertion order and allows any key variant
//! - `Object` members are ordered by name

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Runtime value of a mapped member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Absent value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer, wide enough for every signed and unsigned 64-bit value
    Int(i128),
    /// 64-bit floating point (IEEE-754)
    Float(f64),
    /// UTF-8 string (also carries enumeration variant names)
    String(String),
    /// Ordered sequence
    List(Vec<Value>),
    /// Ordered key/value pairs
    Map(Vec<(Value, Value)>),
    /// Structured object: member name to value
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Build an object value from `(member, value)` pairs
    pub fn object<I, K>(members: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Object(members.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Get the variant name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Object(_) => "Object",
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this is an object value
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Get as bool if this is a Bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i128 if this is an Int value
    pub fn as_int(&self) -> Option<i128> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64 if this is a Float value
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as &str if this is a String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as a slice if this is a List value
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get the members if this is an Object value
    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(members) => Some(members),
            _ => None,
        }
    }

    /// Get the members mutably if this is an Object value
    pub fn as_object_mut(&mut self) -> Option<&mut BTreeMap<String, Value>> {
        match self {
            Value::Object(members) => Some(members),
            _ => None,
        }
    }

    /// Read a member of an Object value
    ///
    /// Returns `None` for non-objects and for missing members.
    pub fn member(&self, name: &str) -> Option<&Value> {
        self.as_object().and_then(|members| members.get(name))
    }

    /// Follow a chain of member names
    pub fn lookup<'a, I>(&self, path: I) -> Option<&Value>
    where
        I: IntoIterator<Item = &'a str>,
    {
        path.into_iter()
            .try_fold(self, |current, name| current.member(name))
    }
}

/// Unwrap an object value, failing with a shape error naming `expected`
pub fn expect_object(value: Value, expected: &str) -> Result<BTreeMap<String, Value>> {
    match value {
        Value::Object(members) => Ok(members),
        other => Err(Error::InvalidValue {
            expected: expected.to_string(),
            found: other.type_name().to_string(),
        }),
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i128::from(i))
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::Int(i128::from(u))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}
