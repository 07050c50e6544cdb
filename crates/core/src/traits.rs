//! Type-description provider traits
//!
//! The rest of the pipeline never inspects Rust types directly. It relies on
//! two capabilities:
//!
//! - [`Mappable`]: declared type plus conversion to and from [`Value`]
//! - [`Describe`]: ordered member list plus a no-argument constructor
//!
//! Structs and enums get both through the [`mappable!`](crate::mappable) and
//! [`mappable_enum!`](crate::mappable_enum) macros. Scalars, collections,
//! `Option` and the `Box`/`Arc` wrappers are covered here.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{Member, TypeRef, ValueType};
use crate::value::Value;

/// A type that can pass through the mapping engine
pub trait Mappable: Sized + Send + Sync + 'static {
    /// Declared type of values of this type
    fn value_type() -> ValueType;

    /// Read this instance into a value tree
    fn to_value(&self) -> Value;

    /// Rebuild an instance from a value tree
    fn from_value(value: Value) -> Result<Self>;
}

/// A structured type whose members can be enumerated
pub trait Describe: Mappable {
    /// Declared members, in declaration order
    fn members() -> Vec<Member>;

    /// Value of a default instance
    fn instantiate() -> Value;

    /// Identity and hooks of this type
    fn type_ref() -> TypeRef {
        TypeRef::of::<Self>()
    }
}

fn mismatch(expected: &str, found: &Value) -> Error {
    Error::InvalidValue {
        expected: expected.to_string(),
        found: found.type_name().to_string(),
    }
}

// ============================================================================
// Scalars
// ============================================================================

macro_rules! impl_int {
    ($($t:ty),*) => {
        $(
            impl Mappable for $t {
                fn value_type() -> ValueType {
                    ValueType::Int
                }

                fn to_value(&self) -> Value {
                    // lossless: no integer type here is wider than 64 bits
                    Value::Int(*self as i128)
                }

                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::Int(i) => <$t>::try_from(i).map_err(|_| Error::InvalidValue {
                            expected: stringify!($t).to_string(),
                            found: format!("out of range integer {}", i),
                        }),
                        other => Err(mismatch(stringify!($t), &other)),
                    }
                }
            }
        )*
    };
}

impl_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_float {
    ($($t:ty),*) => {
        $(
            impl Mappable for $t {
                fn value_type() -> ValueType {
                    ValueType::Float
                }

                fn to_value(&self) -> Value {
                    Value::Float(*self as f64)
                }

                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::Float(f) => Ok(f as $t),
                        Value::Int(i) => Ok(i as $t),
                        other => Err(mismatch(stringify!($t), &other)),
                    }
                }
            }
        )*
    };
}

impl_float!(f32, f64);

impl Mappable for bool {
    fn value_type() -> ValueType {
        ValueType::Bool
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl Mappable for String {
    fn value_type() -> ValueType {
        ValueType::String
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(mismatch("String", &other)),
        }
    }
}

impl Mappable for Value {
    fn value_type() -> ValueType {
        ValueType::Dynamic
    }

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

// ============================================================================
// Containers
// ============================================================================

impl<T: Mappable> Mappable for Option<T> {
    fn value_type() -> ValueType {
        T::value_type()
    }

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: Mappable> Mappable for Vec<T> {
    fn value_type() -> ValueType {
        ValueType::List(Box::new(T::value_type()))
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(Mappable::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch("list", &other)),
        }
    }
}

/// Entries of a map-shaped value; objects count as string-keyed maps
fn map_entries(value: Value) -> Result<Vec<(Value, Value)>> {
    match value {
        Value::Map(entries) => Ok(entries),
        Value::Object(members) => Ok(members
            .into_iter()
            .map(|(k, v)| (Value::String(k), v))
            .collect()),
        other => Err(mismatch("map", &other)),
    }
}

impl<K, V> Mappable for HashMap<K, V>
where
    K: Mappable + Eq + Hash,
    V: Mappable,
{
    fn value_type() -> ValueType {
        ValueType::Map(Box::new(K::value_type()), Box::new(V::value_type()))
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }

    fn from_value(value: Value) -> Result<Self> {
        map_entries(value)?
            .into_iter()
            .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
            .collect()
    }
}

impl<K, V> Mappable for BTreeMap<K, V>
where
    K: Mappable + Ord,
    V: Mappable,
{
    fn value_type() -> ValueType {
        ValueType::Map(Box::new(K::value_type()), Box::new(V::value_type()))
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }

    fn from_value(value: Value) -> Result<Self> {
        map_entries(value)?
            .into_iter()
            .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
            .collect()
    }
}

// ============================================================================
// Wrappers
// ============================================================================

impl<T: Mappable> Mappable for Box<T> {
    fn value_type() -> ValueType {
        match T::value_type() {
            ValueType::Object(inner) => ValueType::Object(TypeRef::wrapper::<Box<T>, T>(inner)),
            other => other,
        }
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn from_value(value: Value) -> Result<Self> {
        T::from_value(value).map(Box::new)
    }
}

impl<T: Mappable> Mappable for Arc<T> {
    fn value_type() -> ValueType {
        match T::value_type() {
            ValueType::Object(inner) => ValueType::Object(TypeRef::wrapper::<Arc<T>, T>(inner)),
            other => other,
        }
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn from_value(value: Value) -> Result<Self> {
        T::from_value(value).map(Arc::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_range_checked() {
        assert_eq!(u8::from_value(Value::Int(200)).unwrap(), 200);
        assert!(u8::from_value(Value::Int(300)).is_err());
        assert!(i32::from_value(Value::String("1".into())).is_err());
    }

    #[test]
    fn test_unsigned_extremes_survive() {
        assert_eq!(u64::from_value(u64::MAX.to_value()).unwrap(), u64::MAX);
        assert_eq!(usize::from_value(usize::MAX.to_value()).unwrap(), usize::MAX);
        assert_eq!(i64::from_value(i64::MIN.to_value()).unwrap(), i64::MIN);
        let err = i64::from_value((u64::MAX - 1).to_value()).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_float_accepts_int() {
        assert_eq!(f64::from_value(Value::Int(2)).unwrap(), 2.0);
        assert_eq!(1.5f32.to_value(), Value::Float(1.5));
    }

    #[test]
    fn test_option_null() {
        assert_eq!(Option::<i64>::None.to_value(), Value::Null);
        assert_eq!(Option::<i64>::from_value(Value::Null).unwrap(), None);
        assert_eq!(Option::<i64>::from_value(Value::Int(4)).unwrap(), Some(4));
        assert_eq!(Option::<i64>::value_type(), ValueType::Int);
    }

    #[test]
    fn test_vec_value_type_and_values() {
        assert_eq!(
            Vec::<String>::value_type(),
            ValueType::List(Box::new(ValueType::String))
        );
        let v = vec![1i64, 2, 3].to_value();
        assert_eq!(Vec::<i64>::from_value(v).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_map_from_object_value() {
        let v = Value::object([("a", Value::Int(1)), ("b", Value::Int(2))]);
        let m = BTreeMap::<String, i64>::from_value(v).unwrap();
        assert_eq!(m.get("a"), Some(&1));
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn test_box_of_scalar_keeps_scalar_type() {
        assert_eq!(Box::<i64>::value_type(), ValueType::Int);
        assert_eq!(Box::new(5i64).to_value(), Value::Int(5));
    }
}
