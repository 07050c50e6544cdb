//! Error types for modelmap
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! # Categories
//!
//! | Category | Variants | Raised by |
//! |----------|----------|-----------|
//! | Configuration | `Configuration`, `DuplicateTypeMap`, `Introspection`, `NoValueReader`, `InvalidPath` | the registering call |
//! | Validation | `Validation` | `validate()` only |
//! | Execution | `Mapping` wrapping `Conversion` / `InvalidValue` | `map()` and friends |
//! | Settings | `Settings` | TOML loading |

use std::fmt;
use thiserror::Error;

/// Result type alias for modelmap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for modelmap
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed registration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A TypeMap already exists under the requested key
    #[error("A TypeMap already exists for {source_type} and {destination_type}{}", name_suffix(.name))]
    DuplicateTypeMap {
        /// Source type name
        source_type: String,
        /// Destination type name
        destination_type: String,
        /// TypeMap name, if any
        name: Option<String>,
    },

    /// Type exposes no members to describe
    #[error("Cannot introspect type {0}: it exposes no mappable members")]
    Introspection(String),

    /// No registered value reader supports the source type
    #[error("No value reader supports source type {0}")]
    NoValueReader(String),

    /// An explicit mapping names a path that does not resolve
    #[error("Invalid property path '{path}' for {type_name}")]
    InvalidPath {
        /// The unresolved path
        path: String,
        /// Type the path was resolved against
        type_name: String,
    },

    /// Aggregate of validation issues
    #[error("Validation failed with {} issue(s):\n{}", .0.len(), render_issues(.0))]
    Validation(Vec<ValidationIssue>),

    /// Failure while executing one mapping
    #[error("Failed to map {source_path} to {destination_path}: {cause}")]
    Mapping {
        /// Source path of the failing mapping
        source_path: String,
        /// Destination path of the failing mapping
        destination_path: String,
        /// Underlying failure
        #[source]
        cause: Box<Error>,
    },

    /// A value could not be converted
    #[error("Cannot convert {from} to {to}: {reason}")]
    Conversion {
        /// Source type or value variant
        from: String,
        /// Destination type
        to: String,
        /// Why the conversion failed
        reason: String,
    },

    /// A value tree does not have the expected shape
    #[error("Invalid value: expected {expected}, found {found}")]
    InvalidValue {
        /// Expected shape
        expected: String,
        /// Shape found
        found: String,
    },

    /// Malformed settings file
    #[error("Invalid settings: {0}")]
    Settings(String),
}

impl Error {
    /// Whether this error is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Configuration(_)
                | Error::DuplicateTypeMap { .. }
                | Error::Introspection(_)
                | Error::NoValueReader(_)
                | Error::InvalidPath { .. }
        )
    }

    /// Issues carried by a validation error
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Error::Validation(issues) => issues,
            _ => &[],
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Settings(e.to_string())
    }
}

fn name_suffix(name: &Option<String>) -> String {
    match name {
        Some(n) => format!(" named '{}'", n),
        None => String::new(),
    }
}

fn render_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .enumerate()
        .map(|(i, issue)| format!("{}) {}", i + 1, issue))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// ValidationIssue
// ============================================================================

/// One problem found in a mapping plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// Destination leaf with no mapping
    Unmapped {
        /// TypeMap display name
        type_map: String,
        /// Destination path
        path: String,
    },
    /// Destination leaf with several equally good source candidates
    Ambiguous {
        /// TypeMap display name
        type_map: String,
        /// Destination path
        path: String,
        /// Candidate source paths
        candidates: Vec<String>,
    },
}

impl ValidationIssue {
    /// Destination path the issue refers to
    pub fn path(&self) -> &str {
        match self {
            ValidationIssue::Unmapped { path, .. } | ValidationIssue::Ambiguous { path, .. } => path,
        }
    }

    /// TypeMap the issue was found in
    pub fn type_map(&self) -> &str {
        match self {
            ValidationIssue::Unmapped { type_map, .. }
            | ValidationIssue::Ambiguous { type_map, .. } => type_map,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::Unmapped { type_map, path } => {
                write!(f, "Unmapped destination property {} in {}", path, type_map)
            }
            ValidationIssue::Ambiguous {
                type_map,
                path,
                candidates,
            } => write!(
                f,
                "Ambiguous destination property {} in {}: matches {}",
                path,
                type_map,
                candidates.join(", ")
            ),
        }
    }
}
