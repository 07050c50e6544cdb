//! Converters and factories
//!
//! A [`Converter`] transforms a typed source value into a typed destination
//! value. Before it is registered, a converter is erased into an
//! [`ErasedConverter`] that works on [`Value`]s and remembers the declared
//! source and destination types it was written for.

use std::any::{type_name, TypeId};
use std::fmt;

use crate::error::{Error, Result};
use crate::traits::{Describe, Mappable};
use crate::types::{short_type_name, ValueType};
use crate::value::Value;

/// Transforms a value of type `S` into a value of type `D`
///
/// Implemented for every `Fn(S) -> Result<D>` closure.
pub trait Converter<S, D>: Send + Sync + 'static {
    /// Convert one value
    fn convert(&self, source: S) -> Result<D>;
}

impl<S, D, F> Converter<S, D> for F
where
    F: Fn(S) -> Result<D> + Send + Sync + 'static,
{
    fn convert(&self, source: S) -> Result<D> {
        self(source)
    }
}

type ConvertFn = dyn Fn(Value) -> Result<Value> + Send + Sync;

/// A converter working on values, tagged with its declared types
pub struct ErasedConverter {
    source_type: ValueType,
    destination_type: ValueType,
    source_name: &'static str,
    destination_name: &'static str,
    func: Box<ConvertFn>,
}

impl ErasedConverter {
    /// Erase `converter`, inferring the declared pair from `S` and `D`
    ///
    /// # Errors
    ///
    /// Returns a configuration error when either type argument is dynamic
    /// (for example `Value`), because the pair cannot be inferred.
    pub fn new<S, D, C>(converter: C) -> Result<Self>
    where
        S: Mappable,
        D: Mappable,
        C: Converter<S, D>,
    {
        let source_type = S::value_type();
        let destination_type = D::value_type();
        if source_type == ValueType::Dynamic || destination_type == ValueType::Dynamic {
            return Err(Error::Configuration(format!(
                "Must declare source type argument <S> and destination type argument <D> for converter, got {} -> {}",
                short_type_name(type_name::<S>()),
                short_type_name(type_name::<D>()),
            )));
        }
        Ok(ErasedConverter {
            source_type,
            destination_type,
            source_name: type_name::<S>(),
            destination_name: type_name::<D>(),
            func: Box::new(move |value| {
                let source = S::from_value(value)?;
                converter.convert(source).map(|d| d.to_value())
            }),
        })
    }

    /// Declared source type
    pub fn source_type(&self) -> &ValueType {
        &self.source_type
    }

    /// Declared destination type
    pub fn destination_type(&self) -> &ValueType {
        &self.destination_type
    }

    /// Whether this converter was declared for `source -> destination`
    pub fn supports(&self, source: &ValueType, destination: &ValueType) -> bool {
        self.source_type.same_as(source) && self.destination_type.same_as(destination)
    }

    /// Apply the converter
    ///
    /// Failures that are not already conversion errors are reported as one,
    /// naming the declared pair.
    pub fn convert(&self, value: Value) -> Result<Value> {
        (self.func)(value).map_err(|e| match e {
            Error::Conversion { .. } => e,
            other => Error::Conversion {
                from: short_type_name(self.source_name).to_string(),
                to: short_type_name(self.destination_name).to_string(),
                reason: other.to_string(),
            },
        })
    }
}

impl fmt::Debug for ErasedConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedConverter")
            .field("source", &short_type_name(self.source_name))
            .field("destination", &short_type_name(self.destination_name))
            .finish()
    }
}

// ============================================================================
// Factory
// ============================================================================

type FactoryFn = dyn Fn() -> Value + Send + Sync;

/// Registered constructor for a destination type
pub struct Factory {
    type_id: TypeId,
    type_name: &'static str,
    func: Box<FactoryFn>,
}

impl Factory {
    /// Factory producing instances of `T`
    pub fn new<T, F>(factory: F) -> Self
    where
        T: Describe,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Factory {
            type_id: T::type_ref().canonical().id(),
            type_name: type_name::<T>(),
            func: Box::new(move || factory().to_value()),
        }
    }

    /// Type produced by this factory
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Produce a new instance
    pub fn create(&self) -> Value {
        (self.func)()
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("type", &short_type_name(self.type_name))
            .finish()
    }
}
