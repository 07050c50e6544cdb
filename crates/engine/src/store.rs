//! TypeMap store
//!
//! Keyed registry that creates each TypeMap once and publishes it.
//!
//! ## Concurrency
//!
//! Lookups go straight to a `DashMap`. Creation takes one store-wide
//! `parking_lot::Mutex` around check-then-build-then-insert, so at most one
//! TypeMap ever exists per key: concurrent `get_or_create` callers observe
//! the winner's TypeMap, concurrent `create` callers after the first fail.
//!
//! The build closure runs under the creation lock. It may describe types
//! (which takes the descriptor cache's own lock) and read the store, but
//! must never create through it.
//!
//! ## Converters
//!
//! Unnamed TypeMaps carrying a global converter double as the converter
//! registry: [`TypeMapStore::converter_for`] finds the one declared for a
//! pair of value types, so member values use converters registered with
//! `add_converter` too.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

use modelmap_core::{ErasedConverter, Result, ValueType};

use crate::typemap::{TypeMap, TypeMapKey};

/// Published TypeMaps of one mapper
#[derive(Debug, Default)]
pub struct TypeMapStore {
    type_maps: DashMap<TypeMapKey, Arc<TypeMap>>,
    create_lock: Mutex<()>,
}

impl TypeMapStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// TypeMap published under `key`
    pub fn get(&self, key: &TypeMapKey) -> Option<Arc<TypeMap>> {
        self.type_maps.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// TypeMap under `key`, building and publishing it if absent
    pub fn get_or_create<F>(&self, key: TypeMapKey, build: F) -> Result<Arc<TypeMap>>
    where
        F: FnOnce() -> Result<TypeMap>,
    {
        if let Some(existing) = self.get(&key) {
            return Ok(existing);
        }

        let _guard = self.create_lock.lock();
        if let Some(existing) = self.get(&key) {
            return Ok(existing);
        }
        self.publish(key, build()?)
    }

    /// Build and publish a TypeMap under a new key
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTypeMap`](modelmap_core::Error::DuplicateTypeMap)
    /// if the key is already taken. `build` is not called in that case.
    pub fn create<F>(&self, key: TypeMapKey, build: F) -> Result<Arc<TypeMap>>
    where
        F: FnOnce() -> Result<TypeMap>,
    {
        let _guard = self.create_lock.lock();
        if self.type_maps.contains_key(&key) {
            return Err(key.duplicate_error());
        }
        self.publish(key, build()?)
    }

    /// All TypeMaps, ordered by source name, destination name, then name
    pub fn all(&self) -> Vec<Arc<TypeMap>> {
        let mut all: Vec<Arc<TypeMap>> = self
            .type_maps
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        all.sort_by(|a, b| a.key().sort_key().cmp(&b.key().sort_key()));
        all
    }

    /// Global converter of an unnamed TypeMap declared for `source -> destination`
    ///
    /// Declared types are compared structurally, so a converter written for
    /// `i64 -> String` serves every integer member converted to a string.
    /// When several TypeMaps qualify, the first in [`all`](Self::all) order
    /// wins.
    pub fn converter_for(
        &self,
        source: &ValueType,
        destination: &ValueType,
    ) -> Option<Arc<ErasedConverter>> {
        self.type_maps
            .iter()
            .filter(|entry| entry.key().name().is_none())
            .filter_map(|entry| {
                let converter = entry.value().converter()?;
                let key = entry.key();
                converter.supports(source, destination).then(|| {
                    (
                        (key.source().name(), key.destination().name()),
                        Arc::clone(converter),
                    )
                })
            })
            .min_by(|a, b| a.0.cmp(&b.0))
            .map(|(_, converter)| converter)
    }

    /// Number of TypeMaps
    pub fn len(&self) -> usize {
        self.type_maps.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.type_maps.is_empty()
    }

    // Caller holds create_lock
    fn publish(&self, key: TypeMapKey, type_map: TypeMap) -> Result<Arc<TypeMap>> {
        let type_map = Arc::new(type_map);
        debug!(
            type_map = %key,
            mappings = type_map.mappings().len(),
            "Published TypeMap"
        );
        self.type_maps.insert(key, Arc::clone(&type_map));
        Ok(type_map)
    }
}
