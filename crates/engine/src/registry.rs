//! Type descriptor cache
//!
//! Describes types once per (type, enclosing type, configuration) and
//! publishes the immutable result for every later lookup.
//!
//! ## Concurrency
//!
//! Published descriptors live in a `DashMap` and are read without taking
//! the creation lock. Creation is serialized by one `parking_lot::Mutex`
//! that guards only the check-then-insert step, so each key is described
//! at most once.
//!
//! Descriptors derived from reader instances are built on every call and
//! never cached: their shape belongs to the instance, not to a type.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::any::TypeId;
use std::sync::Arc;
use tracing::debug;

use modelmap_core::{
    Access, ConfigFingerprint, Configuration, Error, PropertyDescriptor, Result, TypeDescriptor,
    TypeRef, Value, ValueType,
};
use modelmap_matching::tokenize;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DescriptorKey {
    type_id: TypeId,
    context: Option<TypeId>,
    config: ConfigFingerprint,
}

/// Cache of type descriptors owned by one mapper
#[derive(Debug, Default)]
pub struct DescriptorRegistry {
    descriptors: DashMap<DescriptorKey, Arc<TypeDescriptor>>,
    create_lock: Mutex<()>,
}

impl DescriptorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor of `type_ref` described inside `context`
    ///
    /// Wrapper types are canonicalized first, so `Box<T>` and `T` share one
    /// descriptor. Members without public visibility are only included when
    /// the configuration enables field access.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Introspection`] if the type declares no members.
    pub fn describe(
        &self,
        type_ref: TypeRef,
        context: Option<TypeRef>,
        config: &Configuration,
    ) -> Result<Arc<TypeDescriptor>> {
        let type_ref = type_ref.canonical();
        let key = DescriptorKey {
            type_id: type_ref.id(),
            context: context.map(|c| c.canonical().id()),
            config: config.fingerprint(),
        };

        if let Some(existing) = self.descriptors.get(&key) {
            return Ok(Arc::clone(existing.value()));
        }

        let _guard = self.create_lock.lock();
        if let Some(existing) = self.descriptors.get(&key) {
            return Ok(Arc::clone(existing.value()));
        }

        let descriptor = Arc::new(build_descriptor(type_ref, config)?);
        debug!(
            type_name = descriptor.type_name(),
            properties = descriptor.len(),
            "Published type descriptor"
        );
        self.descriptors.insert(key, Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Uncached descriptor of a materialized reader instance
    ///
    /// Member types are inferred from the values: nested objects become
    /// `Dynamic` members carrying a nested descriptor, lists are typed by
    /// their first element, nulls are `Dynamic`. Every member is readable
    /// and none is writable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if `value` is not an object.
    pub fn describe_instance(
        &self,
        type_name: &str,
        value: &Value,
        config: &Configuration,
    ) -> Result<TypeDescriptor> {
        describe_value(type_name, value, config, 1)
    }

    /// Number of cached descriptors
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether nothing has been described yet
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

fn build_descriptor(type_ref: TypeRef, config: &Configuration) -> Result<TypeDescriptor> {
    let members = type_ref.members();
    if members.is_empty() {
        return Err(Error::Introspection(type_ref.short_name().to_string()));
    }

    let properties = members
        .into_iter()
        .enumerate()
        .filter(|(_, m)| m.access == Access::Accessor || config.is_field_access_enabled())
        .map(|(index, m)| {
            let tokens = tokenize(m.name, config.name_tokenizer());
            PropertyDescriptor::new(m.name, m.value_type, m.access, tokens, index)
                .with_capabilities(m.readable, m.writable)
        })
        .collect();

    Ok(TypeDescriptor::new(type_ref, properties))
}

fn describe_value(
    type_name: &str,
    value: &Value,
    config: &Configuration,
    depth: usize,
) -> Result<TypeDescriptor> {
    let members = value.as_object().ok_or_else(|| Error::InvalidValue {
        expected: format!("object for {}", type_name),
        found: value.type_name().to_string(),
    })?;

    let mut properties = Vec::with_capacity(members.len());
    for (index, (name, member)) in members.iter().enumerate() {
        let tokens = tokenize(name, config.name_tokenizer());
        let property = PropertyDescriptor::new(
            name.as_str(),
            infer_type(member),
            Access::Accessor,
            tokens,
            index,
        )
        .with_capabilities(true, false);

        let property = if member.is_object() && depth < config.max_depth() {
            property.with_nested(describe_value(name, member, config, depth + 1)?)
        } else {
            property
        };
        properties.push(property);
    }

    Ok(TypeDescriptor::from_instance(type_name, properties))
}

fn infer_type(value: &Value) -> ValueType {
    match value {
        Value::Bool(_) => ValueType::Bool,
        Value::Int(_) => ValueType::Int,
        Value::Float(_) => ValueType::Float,
        Value::String(_) => ValueType::String,
        Value::List(items) => ValueType::List(Box::new(
            items.first().map(infer_type).unwrap_or(ValueType::Dynamic),
        )),
        Value::Map(_) => ValueType::Map(Box::new(ValueType::Dynamic), Box::new(ValueType::Dynamic)),
        Value::Null | Value::Object(_) => ValueType::Dynamic,
    }
}
