//! Mapping engine
//!
//! Executes a TypeMap against a source value tree and produces (or merges
//! into) a destination value tree.
//!
//! ## Execution
//!
//! - A TypeMap with a global converter hands the whole source to it.
//! - Otherwise each mapping reads its source path, skips if the value is
//!   absent or null, converts the value and writes it at the destination
//!   path, instantiating null intermediate objects on the way.
//! - Conversion precedence: the mapping's explicit converter, then the
//!   converter registered in the store for the declared types, then the
//!   first configured one, then the built-ins. Lists
//!   and maps convert element-wise; objects convert through a nested TypeMap
//!   resolved from the store.
//! - The first failure aborts the call, wrapped with the mapping's paths.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::trace;

use modelmap_core::{
    Configuration, Error, PropertyPath, Result, TypeKey, Value, ValueType,
};

use crate::builder::TypeMapBuilder;
use crate::conversion::convert_scalar;
use crate::property_map::ExplicitMapping;
use crate::registry::DescriptorRegistry;
use crate::store::TypeMapStore;
use crate::typemap::{Mapping, PathStep, TypeMap, TypeMapKey, DYNAMIC};

/// Shape of a mapping source
#[derive(Debug, Clone, Copy)]
pub enum SourceShape<'v> {
    /// A described type
    Typed {
        /// Identity used in the TypeMap key
        key: TypeKey,
        /// Declared type of the source
        value_type: &'v ValueType,
    },
    /// An instance whose shape is read from the value itself
    Instance {
        /// Identity used in the TypeMap key
        key: TypeKey,
        /// The materialized instance
        value: &'v Value,
    },
}

impl SourceShape<'_> {
    /// Identity used in the TypeMap key
    pub fn key(&self) -> TypeKey {
        match self {
            SourceShape::Typed { key, .. } | SourceShape::Instance { key, .. } => *key,
        }
    }
}

/// Resolves and executes TypeMaps against one descriptor cache and store
pub struct MappingEngine<'a> {
    registry: &'a DescriptorRegistry,
    store: &'a TypeMapStore,
}

impl<'a> MappingEngine<'a> {
    /// Engine over `registry` and `store`
    pub fn new(registry: &'a DescriptorRegistry, store: &'a TypeMapStore) -> Self {
        MappingEngine { registry, store }
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// TypeMap for `source -> destination`, built and published if absent
    pub fn resolve(
        &self,
        source: SourceShape<'_>,
        destination: &ValueType,
        name: Option<&str>,
        config: &Configuration,
    ) -> Result<Arc<TypeMap>> {
        let key = type_map_key(source, destination, name);
        self.store.get_or_create(key.clone(), || {
            self.build(key, source, destination, &[], config)
        })
    }

    /// Build (without publishing) the TypeMap `key`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either side cannot be described.
    pub fn build(
        &self,
        key: TypeMapKey,
        source: SourceShape<'_>,
        destination: &ValueType,
        overrides: &[ExplicitMapping],
        config: &Configuration,
    ) -> Result<TypeMap> {
        let destination_ref = destination.object().ok_or_else(|| {
            Error::Configuration(format!(
                "Cannot build TypeMap {}: destination {} has no members to map; register a converter",
                key, destination
            ))
        })?;

        let descriptor = match source {
            SourceShape::Typed { value_type, .. } => match value_type.object() {
                Some(t) => self.registry.describe(t, None, config)?,
                None => {
                    return Err(Error::Configuration(format!(
                        "Cannot build TypeMap {}: source {} has no members to map; register a converter",
                        key, value_type
                    )))
                }
            },
            SourceShape::Instance { key: source_key, value } => Arc::new(
                self.registry
                    .describe_instance(source_key.short_name(), value, config)?,
            ),
        };

        TypeMapBuilder::new(self.registry, config)
            .with_store(self.store)
            .build(key, &descriptor, destination_ref, overrides)
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Execute `type_map` against `source`
    ///
    /// When `destination` is given, mapped members are merged into it;
    /// otherwise a new destination is instantiated.
    pub fn execute(
        &self,
        type_map: &TypeMap,
        source: &Value,
        destination: Option<Value>,
    ) -> Result<Value> {
        if let Some(converter) = type_map.converter() {
            trace!(type_map = %type_map.key(), "Executing global converter");
            return converter
                .convert(source.clone())
                .map_err(|e| wrap(&PropertyPath::root(), &PropertyPath::root(), e));
        }

        let config = type_map.configuration();
        let mut result = match destination {
            Some(existing) if !existing.is_null() => existing,
            _ => instantiate(type_map.destination_value_type(), config),
        };

        for mapping in type_map.mappings() {
            self.apply(mapping, source, &mut result, config).map_err(|e| {
                wrap(&mapping.source_path(), &mapping.destination_path(), e)
            })?;
        }
        Ok(result)
    }

    fn apply(
        &self,
        mapping: &Mapping,
        source: &Value,
        destination: &mut Value,
        config: &Configuration,
    ) -> Result<()> {
        let read = source.lookup(mapping.source_steps().iter().map(|s| s.name.as_str()));
        let value = match read {
            Some(v) if !v.is_null() => v.clone(),
            _ => {
                trace!(
                    source = %mapping.source_path(),
                    destination = %mapping.destination_path(),
                    "Skipping mapping: source value is absent"
                );
                return Ok(());
            }
        };

        let value = match mapping.converter() {
            Some(converter) => converter.convert(value)?,
            None => {
                let existing = destination
                    .lookup(mapping.destination_steps().iter().map(|s| s.name.as_str()))
                    .filter(|v| v.is_object())
                    .cloned();
                self.convert(
                    value,
                    mapping.source_type(),
                    mapping.destination_type(),
                    existing,
                    config,
                )?
            }
        };

        trace!(
            source = %mapping.source_path(),
            destination = %mapping.destination_path(),
            "Mapped"
        );
        write(destination, mapping.destination_steps(), value, config)
    }

    /// Convert `value` declared `source` to `destination`
    fn convert(
        &self,
        value: Value,
        source: &ValueType,
        destination: &ValueType,
        existing: Option<Value>,
        config: &Configuration,
    ) -> Result<Value> {
        if let Some(converter) = self.store.converter_for(source, destination) {
            return converter.convert(value);
        }
        if let Some(converter) = config.converter_for(source, destination) {
            return converter.convert(value);
        }

        match destination {
            ValueType::Dynamic => Ok(value),
            ValueType::List(element) => {
                let source_element = match source {
                    ValueType::List(e) => e.as_ref(),
                    _ => &DYNAMIC,
                };
                match value {
                    Value::List(items) => items
                        .into_iter()
                        .map(|item| self.convert_element(item, source_element, element, config))
                        .collect::<Result<Vec<_>>>()
                        .map(Value::List),
                    other => Err(shape_error("list", &other)),
                }
            }
            ValueType::Map(key_type, value_type) => {
                let (source_key, source_value) = match source {
                    ValueType::Map(k, v) => (k.as_ref(), v.as_ref()),
                    _ => (&DYNAMIC, &DYNAMIC),
                };
                let entries = match value {
                    Value::Map(entries) => entries,
                    Value::Object(members) => members
                        .into_iter()
                        .map(|(k, v)| (Value::String(k), v))
                        .collect(),
                    other => return Err(shape_error("map", &other)),
                };
                entries
                    .into_iter()
                    .map(|(k, v)| {
                        Ok((
                            self.convert_element(k, source_key, key_type, config)?,
                            self.convert_element(v, source_value, value_type, config)?,
                        ))
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Map)
            }
            ValueType::Object(_) => self.convert_object(value, source, destination, existing, config),
            _ => convert_scalar(value, destination),
        }
    }

    fn convert_element(
        &self,
        value: Value,
        source: &ValueType,
        destination: &ValueType,
        config: &Configuration,
    ) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        self.convert(value, source, destination, None, config)
    }

    /// Map an object value through the nested TypeMap for its types
    ///
    /// A value without a declared type (an element read by a value reader,
    /// or a member typed as `Value`) is keyed as `Value -> destination`, so
    /// all such values share one TypeMap whose shape comes from the first
    /// value mapped. Later values with other members only get the members
    /// that plan knows about.
    fn convert_object(
        &self,
        value: Value,
        source: &ValueType,
        destination: &ValueType,
        existing: Option<Value>,
        config: &Configuration,
    ) -> Result<Value> {
        if !value.is_object() {
            return Err(shape_error("object", &value));
        }
        if source.same_as(destination) {
            return Ok(value);
        }

        let shape = match source {
            ValueType::Object(t) => SourceShape::Typed {
                key: TypeKey::from(*t),
                value_type: source,
            },
            _ => SourceShape::Instance {
                key: TypeKey::raw::<Value>(),
                value: &value,
            },
        };
        let nested = self.resolve(shape, destination, None, config)?;
        self.execute(&nested, &value, existing)
    }
}

/// Key of the unnamed or named TypeMap for `source -> destination`
pub(crate) fn type_map_key(
    source: SourceShape<'_>,
    destination: &ValueType,
    name: Option<&str>,
) -> TypeMapKey {
    let destination_key = match destination {
        ValueType::Object(t) => TypeKey::from(*t),
        _ => TypeKey::raw::<Value>(),
    };
    TypeMapKey::new(source.key(), destination_key, name)
}

/// New destination value: registered factory, else the type's default
pub fn instantiate(value_type: &ValueType, config: &Configuration) -> Value {
    match value_type.object() {
        Some(t) => match config.factory_for(t.id()) {
            Some(factory) => factory.create(),
            None => t.instantiate(),
        },
        None => Value::Object(BTreeMap::new()),
    }
}

/// Write `value` at `steps`, instantiating null intermediates
fn write(
    destination: &mut Value,
    steps: &[PathStep],
    value: Value,
    config: &Configuration,
) -> Result<()> {
    let Some((last, parents)) = steps.split_last() else {
        *destination = value;
        return Ok(());
    };

    let mut current = destination;
    for step in parents {
        let members = match current {
            Value::Object(members) => members,
            other => return Err(shape_error("object", other)),
        };
        let slot = members.entry(step.name.clone()).or_insert(Value::Null);
        if slot.is_null() {
            *slot = instantiate(&step.value_type, config);
        }
        current = slot;
    }

    match current {
        Value::Object(members) => {
            members.insert(last.name.clone(), value);
            Ok(())
        }
        other => Err(shape_error("object", other)),
    }
}

fn shape_error(expected: &str, found: &Value) -> Error {
    Error::InvalidValue {
        expected: expected.to_string(),
        found: found.type_name().to_string(),
    }
}

fn wrap(source: &PropertyPath, destination: &PropertyPath, cause: Error) -> Error {
    Error::Mapping {
        source_path: source.to_string(),
        destination_path: destination.to_string(),
        cause: Box::new(cause),
    }
}
