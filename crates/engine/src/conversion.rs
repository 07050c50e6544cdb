//! Built-in scalar conversions
//!
//! Applied when no user converter is registered for a mapping's types.
//! Dispatch is on the runtime value and the declared destination type:
//!
//! | Destination | Accepted values |
//! |-------------|-----------------|
//! | bool | Bool, String (`"true"`/`"false"`, any case) |
//! | int | Int, integral Float, String |
//! | float | Float, Int, String |
//! | string | String, Bool, Int, Float |
//! | enum | String naming one of the variants |
//! | dynamic | anything |
//!
//! Integers never convert to booleans.

use modelmap_core::{Error, Result, Value, ValueType};

/// Convert a scalar `value` to `destination`
pub fn convert_scalar(value: Value, destination: &ValueType) -> Result<Value> {
    match (destination, value) {
        (ValueType::Dynamic, v) => Ok(v),

        (ValueType::Bool, Value::Bool(b)) => Ok(Value::Bool(b)),
        (ValueType::Bool, Value::String(s)) => parse_bool(&s),
        (ValueType::Bool, Value::Int(_)) => Err(Error::Conversion {
            from: "Int".to_string(),
            to: destination.to_string(),
            reason: "integers are not converted to booleans".to_string(),
        }),

        (ValueType::Int, Value::Int(i)) => Ok(Value::Int(i)),
        (ValueType::Int, Value::Float(f)) => float_to_int(f),
        (ValueType::Int, Value::String(s)) => s
            .trim()
            .parse::<i128>()
            .map(Value::Int)
            .map_err(|e| failed("String", destination, e)),

        (ValueType::Float, Value::Float(f)) => Ok(Value::Float(f)),
        (ValueType::Float, Value::Int(i)) => Ok(Value::Float(i as f64)),
        (ValueType::Float, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| failed("String", destination, e)),

        (ValueType::String, Value::String(s)) => Ok(Value::String(s)),
        (ValueType::String, Value::Bool(b)) => Ok(Value::String(b.to_string())),
        (ValueType::String, Value::Int(i)) => Ok(Value::String(i.to_string())),
        (ValueType::String, Value::Float(f)) => Ok(Value::String(f.to_string())),

        (ValueType::Enum(e), Value::String(s)) => {
            if e.has_variant(&s) {
                Ok(Value::String(s))
            } else {
                Err(Error::Conversion {
                    from: format!("'{}'", s),
                    to: destination.to_string(),
                    reason: format!("expected one of {}", e.variants().join(", ")),
                })
            }
        }

        (_, v) => Err(Error::Conversion {
            from: v.type_name().to_string(),
            to: destination.to_string(),
            reason: "no built-in conversion".to_string(),
        }),
    }
}

fn parse_bool(s: &str) -> Result<Value> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        _ => Err(Error::Conversion {
            from: format!("'{}'", s),
            to: "bool".to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

fn float_to_int(f: f64) -> Result<Value> {
    // u64::MAX as f64 rounds up to 2^64, which is out of range
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < u64::MAX as f64 {
        Ok(Value::Int(f as i128))
    } else {
        Err(Error::Conversion {
            from: f.to_string(),
            to: "int".to_string(),
            reason: "not an integral value in range".to_string(),
        })
    }
}

fn failed(from: &str, to: &ValueType, reason: impl std::fmt::Display) -> Error {
    Error::Conversion {
        from: from.to_string(),
        to: to.to_string(),
        reason: reason.to_string(),
    }
}
