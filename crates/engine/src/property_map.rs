//! Explicit mapping overrides
//!
//! [`PropertyMap`] is the boundary through which callers supply mappings
//! the builder should not infer: a list of source path / destination path
//! pairs, each with an optional converter. Explicit mappings always win
//! over implicit matches for the same destination path.

use std::marker::PhantomData;
use std::sync::Arc;

use modelmap_core::{Converter, ErasedConverter, Mappable, PropertyPath, Result};

/// One explicit source -> destination correspondence
#[derive(Debug, Clone)]
pub struct ExplicitMapping {
    source: PropertyPath,
    destination: PropertyPath,
    converter: Option<Arc<ErasedConverter>>,
}

impl ExplicitMapping {
    /// Source path
    pub fn source(&self) -> &PropertyPath {
        &self.source
    }

    /// Destination path
    pub fn destination(&self) -> &PropertyPath {
        &self.destination
    }

    /// Converter applied to the value read
    pub fn converter(&self) -> Option<&Arc<ErasedConverter>> {
        self.converter.as_ref()
    }
}

/// Explicit mappings from `S` to `D`
///
/// # Example
///
/// ```
/// use modelmap_core::mappable;
/// use modelmap_engine::PropertyMap;
///
/// mappable! {
///     #[derive(Debug, Default)]
///     pub struct Person { pub surname: String }
/// }
/// mappable! {
///     #[derive(Debug, Default)]
///     pub struct PersonDto { pub last_name: String }
/// }
///
/// let overrides = PropertyMap::<Person, PersonDto>::new().map("surname", "last_name");
/// assert_eq!(overrides.mappings().len(), 1);
/// ```
#[derive(Debug)]
pub struct PropertyMap<S, D> {
    name: Option<String>,
    mappings: Vec<ExplicitMapping>,
    _types: PhantomData<fn(S) -> D>,
}

impl<S: Mappable, D: Mappable> PropertyMap<S, D> {
    /// Overrides for the unnamed TypeMap
    pub fn new() -> Self {
        PropertyMap {
            name: None,
            mappings: Vec::new(),
            _types: PhantomData,
        }
    }

    /// Overrides for the TypeMap called `name`
    pub fn named(name: impl Into<String>) -> Self {
        PropertyMap {
            name: Some(name.into()),
            mappings: Vec::new(),
            _types: PhantomData,
        }
    }

    /// Builder: map the dotted `source` path to the dotted `destination` path
    pub fn map(mut self, source: &str, destination: &str) -> Self {
        self.mappings.push(ExplicitMapping {
            source: PropertyPath::parse(source),
            destination: PropertyPath::parse(destination),
            converter: None,
        });
        self
    }

    /// Builder: map `source` to `destination` through `converter`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the converter's type pair cannot be
    /// inferred.
    pub fn map_with<SV, DV, C>(mut self, source: &str, destination: &str, converter: C) -> Result<Self>
    where
        SV: Mappable,
        DV: Mappable,
        C: Converter<SV, DV>,
    {
        self.mappings.push(ExplicitMapping {
            source: PropertyPath::parse(source),
            destination: PropertyPath::parse(destination),
            converter: Some(Arc::new(ErasedConverter::new(converter)?)),
        });
        Ok(self)
    }

    /// TypeMap name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Explicit mappings in declaration order
    pub fn mappings(&self) -> &[ExplicitMapping] {
        &self.mappings
    }
}

impl<S: Mappable, D: Mappable> Default for PropertyMap<S, D> {
    fn default() -> Self {
        Self::new()
    }
}
