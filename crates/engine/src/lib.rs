//! Mapping engine for modelmap
//!
//! This crate orchestrates the lower layers:
//! - ModelMapper: the public facade owning configuration and caches
//! - Descriptor cache: type descriptors, described once per key
//! - TypeMap store: mapping plans, created once and published
//! - Builder: matches destination leaves to source paths
//! - Executor: runs a plan against a value tree
//! - Validation: unmapped and ambiguous destination leaves
//!
//! The engine is the only component that knows about:
//! - Plan resolution and caching
//! - Conversion precedence (explicit, configured, built-in)
//! - Value readers for external sources

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod conversion;
pub mod executor;
pub mod json_reader;
pub mod mapper;
pub mod property_map;
pub mod registry;
pub mod store;
pub mod typemap;
pub mod validation;

pub use builder::{convertible, TypeMapBuilder};
pub use conversion::convert_scalar;
pub use executor::{MappingEngine, SourceShape};
pub use json_reader::{json_to_value, JsonValueReader};
pub use mapper::ModelMapper;
pub use property_map::{ExplicitMapping, PropertyMap};
pub use registry::DescriptorRegistry;
pub use store::TypeMapStore;
pub use typemap::{Ambiguity, Mapping, PathStep, TypeMap, TypeMapKey};
pub use validation::{validate, validate_all};
