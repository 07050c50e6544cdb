//! Core types and traits for modelmap
//!
//! This crate defines the foundational types used throughout the system:
//! - Value: runtime representation of mapped instances
//! - ValueType, TypeRef, EnumType, Member: declared types and identities
//! - Mappable, Describe: the type-description provider capability
//! - mappable!, mappable_enum!: generators for that capability
//! - TypeDescriptor, PropertyDescriptor, PropertyPath: described members
//! - Configuration, MapperSettings: configuration snapshot and file form
//! - Converter, ErasedConverter, Factory: value conversion and construction
//! - ValueReader: adapter contract for external structured sources
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

// Module declarations
pub mod config;
pub mod convert;
pub mod descriptor;
pub mod error;
mod macros;
pub mod reader;
pub mod traits;
pub mod types;
pub mod value;

// Re-export commonly used types and traits
pub use config::{
    ConfigFingerprint, Configuration, MapperSettings, MatchingStrategy, NameTokenizer,
    DEFAULT_MAX_DEPTH,
};
pub use convert::{Converter, ErasedConverter, Factory};
pub use descriptor::{PropertyDescriptor, PropertyPath, Token, TypeDescriptor};
pub use error::{Error, Result, ValidationIssue};
pub use reader::ValueReader;
pub use traits::{Describe, Mappable};
pub use types::{short_type_name, Access, EnumType, Member, TypeKey, TypeRef, ValueType};
pub use value::Value;
