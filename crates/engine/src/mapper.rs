//! ModelMapper facade
//!
//! Owns one configuration snapshot, one descriptor cache and one TypeMap
//! store. Every operation runs on the caller's thread; a `ModelMapper` is
//! `Send + Sync` and is meant to be shared through `Arc`.
//!
//! ## Mapping API
//!
//! - `map::<D>(&source)`: new destination instance
//! - `map_into(&source, &mut destination)`: merge into an existing instance
//! - `map_external::<S, D>(&external)`: source read through a value reader
//!
//! All three resolve-or-create the TypeMap transparently. Explicit creation
//! (`create_type_map`, `add_mappings`) fails if the key already exists.
//!
//! ## Failure policy
//!
//! A failed mapping aborts the call. `map_into` executes against a copy of
//! the destination and only assigns it back on success, so a failure never
//! leaves the caller's instance partially mapped.

use std::any::{type_name, Any, TypeId};
use std::sync::Arc;
use tracing::debug;

use modelmap_core::{
    Configuration, Converter, ErasedConverter, Error, Mappable, Result, TypeKey, Value,
};

use crate::executor::{MappingEngine, SourceShape};
use crate::property_map::PropertyMap;
use crate::registry::DescriptorRegistry;
use crate::store::TypeMapStore;
use crate::typemap::{TypeMap, TypeMapKey};
use crate::validation::validate_all;

/// Object-graph mapper
///
/// # Example
///
/// ```
/// use modelmap_core::mappable;
/// use modelmap_engine::ModelMapper;
///
/// mappable! {
///     #[derive(Debug, Clone, Default)]
///     pub struct Person {
///         pub first_name: String,
///         pub age: i64,
///     }
/// }
///
/// mappable! {
///     #[derive(Debug, Clone, Default, PartialEq)]
///     pub struct PersonDto {
///         pub first_name: String,
///         pub age: String,
///     }
/// }
///
/// let mapper = ModelMapper::new();
/// let person = Person { first_name: "Ada".into(), age: 36 };
/// let dto: PersonDto = mapper.map(&person).unwrap();
/// assert_eq!(dto, PersonDto { first_name: "Ada".into(), age: "36".into() });
/// ```
#[derive(Debug, Default)]
pub struct ModelMapper {
    config: Configuration,
    registry: DescriptorRegistry,
    store: TypeMapStore,
}

impl ModelMapper {
    /// Mapper with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapper over `config`
    pub fn with_configuration(config: Configuration) -> Self {
        debug!(
            strategy = ?config.matching_strategy(),
            tokenizer = ?config.name_tokenizer(),
            field_access = config.is_field_access_enabled(),
            converters = config.converters().len(),
            readers = config.value_readers().len(),
            "Created ModelMapper"
        );
        ModelMapper {
            config,
            registry: DescriptorRegistry::new(),
            store: TypeMapStore::new(),
        }
    }

    /// Configuration snapshot of this mapper
    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    fn engine(&self) -> MappingEngine<'_> {
        MappingEngine::new(&self.registry, &self.store)
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register a global converter for `S -> D`
    ///
    /// The TypeMap for the pair is created if absent. Once a converter is
    /// set, it handles the whole mapping and per-property mappings of that
    /// TypeMap are bypassed.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `S` or `D` is dynamic, or if the
    /// TypeMap already has a converter.
    pub fn add_converter<S, D, C>(&self, converter: C) -> Result<Arc<TypeMap>>
    where
        S: Mappable,
        D: Mappable,
        C: Converter<S, D>,
    {
        let converter = Arc::new(ErasedConverter::new::<S, D, C>(converter)?);
        let key = TypeMapKey::new(TypeKey::of::<S>(), TypeKey::of::<D>(), None);
        let type_map = self.store.get_or_create(key.clone(), || {
            Ok(TypeMap::converter_only(key, D::value_type(), self.config.clone()))
        })?;
        type_map.set_converter(converter)?;
        debug!(type_map = %type_map.key(), "Registered converter");
        Ok(type_map)
    }

    /// Create a TypeMap with explicit overrides from `property_map`
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTypeMap`] if the key already exists, or a
    /// configuration error if an override path does not resolve.
    pub fn add_mappings<S, D>(&self, property_map: PropertyMap<S, D>) -> Result<Arc<TypeMap>>
    where
        S: Mappable,
        D: Mappable,
    {
        self.create::<S, D>(property_map.name(), &self.config, &property_map)
    }

    /// Create the unnamed TypeMap `S -> D`
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTypeMap`] if it already exists.
    pub fn create_type_map<S: Mappable, D: Mappable>(&self) -> Result<Arc<TypeMap>> {
        self.create::<S, D>(None, &self.config, &PropertyMap::new())
    }

    /// Create the TypeMap `S -> D` named `name`
    pub fn create_named_type_map<S: Mappable, D: Mappable>(
        &self,
        name: &str,
    ) -> Result<Arc<TypeMap>> {
        self.create::<S, D>(Some(name), &self.config, &PropertyMap::new())
    }

    /// Create the unnamed TypeMap `S -> D` under its own configuration
    pub fn create_type_map_with<S: Mappable, D: Mappable>(
        &self,
        config: Configuration,
    ) -> Result<Arc<TypeMap>> {
        self.create::<S, D>(None, &config, &PropertyMap::new())
    }

    fn create<S: Mappable, D: Mappable>(
        &self,
        name: Option<&str>,
        config: &Configuration,
        property_map: &PropertyMap<S, D>,
    ) -> Result<Arc<TypeMap>> {
        let key = TypeMapKey::new(TypeKey::of::<S>(), TypeKey::of::<D>(), name);
        let source_type = S::value_type();
        let shape = SourceShape::Typed {
            key: key.source(),
            value_type: &source_type,
        };
        let engine = self.engine();
        self.store.create(key.clone(), || {
            engine.build(key, shape, &D::value_type(), property_map.mappings(), config)
        })
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// The unnamed TypeMap `S -> D`, if created
    pub fn get_type_map<S: Mappable, D: Mappable>(&self) -> Option<Arc<TypeMap>> {
        self.store
            .get(&TypeMapKey::new(TypeKey::of::<S>(), TypeKey::of::<D>(), None))
    }

    /// The TypeMap `S -> D` named `name`, if created
    pub fn get_named_type_map<S: Mappable, D: Mappable>(&self, name: &str) -> Option<Arc<TypeMap>> {
        self.store
            .get(&TypeMapKey::new(TypeKey::of::<S>(), TypeKey::of::<D>(), Some(name)))
    }

    /// All TypeMaps, ordered by source, destination and name
    pub fn type_maps(&self) -> Vec<Arc<TypeMap>> {
        self.store.all()
    }

    // ========================================================================
    // Mapping
    // ========================================================================

    /// Map `source` to a new `D`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no plan can be built for the pair,
    /// or [`Error::Mapping`] if a mapping fails.
    pub fn map<D: Mappable>(&self, source: &impl Mappable) -> Result<D> {
        self.map_with_name(source, None)
    }

    /// Map `source` to a new `D` through the TypeMap named `name`
    pub fn map_named<D: Mappable>(&self, source: &impl Mappable, name: &str) -> Result<D> {
        self.map_with_name(source, Some(name))
    }

    /// Map `source` into `destination`, keeping unmapped members
    ///
    /// On failure `destination` is left unchanged.
    pub fn map_into<D: Mappable>(&self, source: &impl Mappable, destination: &mut D) -> Result<()> {
        let type_map = self.resolve_typed::<_, D>(source, None)?;
        let result = self
            .engine()
            .execute(&type_map, &source.to_value(), Some(destination.to_value()))?;
        *destination = D::from_value(result)?;
        Ok(())
    }

    /// Map an external object read through a configured value reader
    ///
    /// The TypeMap is keyed by `S`, so the first instance mapped determines
    /// the plan used for every later instance of `S`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoValueReader`] if no reader supports `S`.
    pub fn map_external<S: Any, D: Mappable>(&self, source: &S) -> Result<D> {
        let reader = self
            .config
            .reader_for(TypeId::of::<S>())
            .ok_or_else(|| Error::NoValueReader(type_name::<S>().to_string()))?;
        let value = reader.read(source);

        let shape = SourceShape::Instance {
            key: TypeKey::raw::<S>(),
            value: &value,
        };
        let engine = self.engine();
        let type_map = engine.resolve(shape, &D::value_type(), None, &self.config)?;
        debug!(reader = reader.name(), type_map = %type_map.key(), "Mapping external source");
        D::from_value(engine.execute(&type_map, &value, None)?)
    }

    fn map_with_name<S: Mappable, D: Mappable>(&self, source: &S, name: Option<&str>) -> Result<D> {
        let type_map = self.resolve_typed::<S, D>(source, name)?;
        let value: Value = self.engine().execute(&type_map, &source.to_value(), None)?;
        D::from_value(value)
    }

    fn resolve_typed<S: Mappable, D: Mappable>(
        &self,
        _source: &S,
        name: Option<&str>,
    ) -> Result<Arc<TypeMap>> {
        let source_type = S::value_type();
        let shape = SourceShape::Typed {
            key: TypeKey::of::<S>(),
            value_type: &source_type,
        };
        self.engine()
            .resolve(shape, &D::value_type(), name, &self.config)
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate every TypeMap
    ///
    /// # Errors
    ///
    /// Returns one [`Error::Validation`] listing every issue found.
    pub fn validate(&self) -> Result<()> {
        validate_all(&self.type_maps())
    }
}
