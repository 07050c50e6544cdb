//! Mapping plans
//!
//! A [`TypeMap`] is the reusable plan for one (source type, destination
//! type, name) triple: the ordered [`Mapping`]s found by the builder or
//! supplied explicitly, the destination leaves that could not be matched,
//! and an optional global converter that replaces the whole plan.
//!
//! TypeMaps are immutable once published. The global converter is the one
//! late write: a set-once cell that never replaces an existing converter.

use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

use modelmap_core::{
    Configuration, Error, ErasedConverter, PropertyPath, Result, TypeKey, ValueType,
};

// ============================================================================
// TypeMapKey
// ============================================================================

/// Identity of a TypeMap within a store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeMapKey {
    source: TypeKey,
    destination: TypeKey,
    name: Option<String>,
}

impl TypeMapKey {
    /// Key for `source -> destination`, optionally named
    pub fn new(source: TypeKey, destination: TypeKey, name: Option<&str>) -> Self {
        TypeMapKey {
            source,
            destination,
            name: name.map(String::from),
        }
    }

    /// Source type
    pub fn source(&self) -> TypeKey {
        self.source
    }

    /// Destination type
    pub fn destination(&self) -> TypeKey {
        self.destination
    }

    /// TypeMap name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn sort_key(&self) -> (&'static str, &'static str, Option<&str>) {
        (self.source.name(), self.destination.name(), self.name())
    }

    /// Error raised when this key is already taken
    pub(crate) fn duplicate_error(&self) -> Error {
        Error::DuplicateTypeMap {
            source_type: self.source.short_name().to_string(),
            destination_type: self.destination.short_name().to_string(),
            name: self.name.clone(),
        }
    }
}

impl fmt::Display for TypeMapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)?;
        if let Some(name) = &self.name {
            write!(f, " [{}]", name)?;
        }
        Ok(())
    }
}

// ============================================================================
// Mapping
// ============================================================================

/// One read or write step of a mapping path
#[derive(Debug, Clone, PartialEq)]
pub struct PathStep {
    /// Member name
    pub name: String,
    /// Declared type of the member
    pub value_type: ValueType,
}

impl PathStep {
    /// Create a step
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        PathStep {
            name: name.into(),
            value_type,
        }
    }
}

/// Dotted path of a chain of steps
pub(crate) fn path_of(steps: &[PathStep]) -> PropertyPath {
    steps.iter().map(|s| s.name.as_str()).collect()
}

pub(crate) static DYNAMIC: ValueType = ValueType::Dynamic;

/// A source path paired with a destination path
#[derive(Debug, Clone)]
pub struct Mapping {
    source: Vec<PathStep>,
    destination: Vec<PathStep>,
    converter: Option<Arc<ErasedConverter>>,
    explicit: bool,
}

impl Mapping {
    pub(crate) fn implicit(source: Vec<PathStep>, destination: Vec<PathStep>) -> Self {
        Mapping {
            source,
            destination,
            converter: None,
            explicit: false,
        }
    }

    pub(crate) fn explicit(
        source: Vec<PathStep>,
        destination: Vec<PathStep>,
        converter: Option<Arc<ErasedConverter>>,
    ) -> Self {
        Mapping {
            source,
            destination,
            converter,
            explicit: true,
        }
    }

    /// Read steps from the source root
    pub fn source_steps(&self) -> &[PathStep] {
        &self.source
    }

    /// Write steps from the destination root
    pub fn destination_steps(&self) -> &[PathStep] {
        &self.destination
    }

    /// Dotted source path
    pub fn source_path(&self) -> PropertyPath {
        path_of(&self.source)
    }

    /// Dotted destination path
    pub fn destination_path(&self) -> PropertyPath {
        path_of(&self.destination)
    }

    /// Declared type of the value read
    pub fn source_type(&self) -> &ValueType {
        self.source
            .last()
            .map(|s| &s.value_type)
            .unwrap_or(&DYNAMIC)
    }

    /// Declared type of the member written
    pub fn destination_type(&self) -> &ValueType {
        self.destination
            .last()
            .map(|s| &s.value_type)
            .unwrap_or(&DYNAMIC)
    }

    /// Converter supplied with an explicit mapping
    pub fn converter(&self) -> Option<&Arc<ErasedConverter>> {
        self.converter.as_ref()
    }

    /// Whether the mapping was supplied explicitly
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }
}

/// A destination leaf matched equally well by several source paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguity {
    /// Destination path
    pub destination: PropertyPath,
    /// Candidate source paths, best first in discovery order
    pub candidates: Vec<PropertyPath>,
}

// ============================================================================
// TypeMap
// ============================================================================

/// Reusable mapping plan between a source and a destination type
#[derive(Debug)]
pub struct TypeMap {
    key: TypeMapKey,
    destination_type: ValueType,
    config: Configuration,
    mappings: Vec<Mapping>,
    unmapped: Vec<PropertyPath>,
    ambiguities: Vec<Ambiguity>,
    converter: OnceCell<Arc<ErasedConverter>>,
}

impl TypeMap {
    pub(crate) fn new(
        key: TypeMapKey,
        destination_type: ValueType,
        config: Configuration,
        mappings: Vec<Mapping>,
        unmapped: Vec<PropertyPath>,
        ambiguities: Vec<Ambiguity>,
    ) -> Self {
        TypeMap {
            key,
            destination_type,
            config,
            mappings,
            unmapped,
            ambiguities,
            converter: OnceCell::new(),
        }
    }

    /// A plan with no property mappings, executed only through its converter
    pub(crate) fn converter_only(
        key: TypeMapKey,
        destination_type: ValueType,
        config: Configuration,
    ) -> Self {
        Self::new(key, destination_type, config, Vec::new(), Vec::new(), Vec::new())
    }

    /// Key of this TypeMap
    pub fn key(&self) -> &TypeMapKey {
        &self.key
    }

    /// Source type
    pub fn source_type(&self) -> TypeKey {
        self.key.source()
    }

    /// Destination type
    pub fn destination_type(&self) -> TypeKey {
        self.key.destination()
    }

    /// Declared type of the destination
    pub fn destination_value_type(&self) -> &ValueType {
        &self.destination_type
    }

    /// TypeMap name, if any
    pub fn name(&self) -> Option<&str> {
        self.key.name()
    }

    /// Configuration snapshot the plan was built with
    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Mappings, ordered by destination path
    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    /// Mapping writing `destination`, if any
    ///
    /// # Example
    ///
    /// ```
    /// use modelmap_core::{mappable, PropertyPath};
    /// use modelmap_engine::ModelMapper;
    ///
    /// mappable! {
    ///     #[derive(Debug, Default)]
    ///     pub struct User { pub name: String }
    /// }
    /// mappable! {
    ///     #[derive(Debug, Default)]
    ///     pub struct UserDto { pub name: String }
    /// }
    ///
    /// let mapper = ModelMapper::new();
    /// let type_map = mapper.create_type_map::<User, UserDto>().unwrap();
    /// let mapping = type_map.mapping_for(&PropertyPath::parse("name")).unwrap();
    /// assert_eq!(mapping.source_path().to_string(), "name");
    /// ```
    pub fn mapping_for(&self, destination: &PropertyPath) -> Option<&Mapping> {
        self.mappings
            .iter()
            .find(|m| m.destination_path() == *destination)
    }

    /// Destination leaves no source matched
    pub fn unmapped(&self) -> &[PropertyPath] {
        &self.unmapped
    }

    /// Destination leaves with tied candidates
    pub fn ambiguities(&self) -> &[Ambiguity] {
        &self.ambiguities
    }

    /// Global converter, if set
    pub fn converter(&self) -> Option<&Arc<ErasedConverter>> {
        self.converter.get()
    }

    /// Whether a global converter is set
    pub fn has_converter(&self) -> bool {
        self.converter.get().is_some()
    }

    /// Set the global converter
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a converter is already set.
    pub fn set_converter(&self, converter: Arc<ErasedConverter>) -> Result<()> {
        self.converter.set(converter).map_err(|_| {
            Error::Configuration(format!("A converter is already set for TypeMap {}", self.key))
        })
    }
}

impl fmt::Display for TypeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeMap[{}]", self.key)
    }
}
