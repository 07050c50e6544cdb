//! Type and property descriptors
//!
//! A [`TypeDescriptor`] is the immutable, cached description of a type's
//! mappable members. Descriptors are produced by the engine's descriptor
//! registry; this module only defines their shape.

use std::fmt;
use std::sync::Arc;

use crate::types::{Access, TypeRef, ValueType};

/// A normalized, lower-cased fragment of a member name
pub type Token = String;

// ============================================================================
// PropertyDescriptor
// ============================================================================

/// One mappable member of a described type
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    name: String,
    value_type: ValueType,
    access: Access,
    readable: bool,
    writable: bool,
    tokens: Vec<Token>,
    index: usize,
    nested: Option<Arc<TypeDescriptor>>,
}

impl PropertyDescriptor {
    /// Create a descriptor for member `name` at declaration position `index`
    pub fn new(
        name: impl Into<String>,
        value_type: ValueType,
        access: Access,
        tokens: Vec<Token>,
        index: usize,
    ) -> Self {
        PropertyDescriptor {
            name: name.into(),
            value_type,
            access,
            readable: true,
            writable: true,
            tokens,
            index,
            nested: None,
        }
    }

    /// Builder: set read/write capabilities
    pub fn with_capabilities(mut self, readable: bool, writable: bool) -> Self {
        self.readable = readable;
        self.writable = writable;
        self
    }

    /// Builder: attach a pre-built descriptor of the member's value
    ///
    /// Used for instance-derived descriptors, whose nested shapes cannot be
    /// looked up by type.
    pub fn with_nested(mut self, nested: TypeDescriptor) -> Self {
        self.nested = Some(Arc::new(nested));
        self
    }

    /// Member name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Exposure of the member
    pub fn access(&self) -> Access {
        self.access
    }

    /// Whether the member can be read
    pub fn is_readable(&self) -> bool {
        self.readable
    }

    /// Whether the member can be written
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Precomputed token sequence of the member name
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Position in the declaring type's member list
    pub fn index(&self) -> usize {
        self.index
    }

    /// Pre-built descriptor of the member's value, if any
    pub fn nested(&self) -> Option<&Arc<TypeDescriptor>> {
        self.nested.as_ref()
    }

    /// Whether the member holds a structured value
    pub fn is_structured(&self) -> bool {
        self.nested.is_some() || matches!(self.value_type, ValueType::Object(_))
    }
}

// ============================================================================
// TypeDescriptor
// ============================================================================

/// Immutable description of a type's mappable members
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    type_name: String,
    type_ref: Option<TypeRef>,
    properties: Vec<PropertyDescriptor>,
}

impl TypeDescriptor {
    /// Descriptor of a statically described type
    pub fn new(type_ref: TypeRef, properties: Vec<PropertyDescriptor>) -> Self {
        TypeDescriptor {
            type_name: type_ref.short_name().to_string(),
            type_ref: Some(type_ref),
            properties,
        }
    }

    /// Descriptor derived from an instance (value-reader sources)
    pub fn from_instance(type_name: impl Into<String>, properties: Vec<PropertyDescriptor>) -> Self {
        TypeDescriptor {
            type_name: type_name.into(),
            type_ref: None,
            properties,
        }
    }

    /// Display name of the described type
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The described type, `None` for instance-derived descriptors
    pub fn type_ref(&self) -> Option<TypeRef> {
        self.type_ref
    }

    /// Members in declaration order
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Look up a member by name
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the type exposes no members
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

// ============================================================================
// PropertyPath
// ============================================================================

/// Dotted chain of member names, e.g. `customer.address.city`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyPath(Vec<String>);

impl PropertyPath {
    /// Empty path (the root)
    pub fn root() -> Self {
        PropertyPath(Vec::new())
    }

    /// Parse a dotted path; empty segments are dropped
    pub fn parse(path: &str) -> Self {
        PropertyPath(
            path.split('.')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    /// New path with `segment` appended
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        PropertyPath(segments)
    }

    /// Member names from the root
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the root path
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `self` equals `other` or lies beneath it
    pub fn starts_with(&self, other: &PropertyPath) -> bool {
        self.0.starts_with(&other.0)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        f.write_str(&self.0.join("."))
    }
}

impl<S: Into<String>> FromIterator<S> for PropertyPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        PropertyPath(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_parse_and_display() {
        let p = PropertyPath::parse("customer.address.city");
        assert_eq!(p.len(), 3);
        assert_eq!(p.to_string(), "customer.address.city");
        assert_eq!(PropertyPath::parse(" a..b ").segments(), &["a", "b"]);
        assert_eq!(PropertyPath::root().to_string(), "<root>");
    }

    #[test]
    fn test_path_prefix() {
        let parent = PropertyPath::parse("customer");
        let child = parent.child("name");
        assert!(child.starts_with(&parent));
        assert!(!parent.starts_with(&child));
        assert!(child.starts_with(&child));
    }

    #[test]
    fn test_descriptor_lookup() {
        let desc = TypeDescriptor::from_instance(
            "json",
            vec![PropertyDescriptor::new(
                "firstName",
                ValueType::String,
                Access::Accessor,
                vec!["first".into(), "name".into()],
                0,
            )
            .with_capabilities(true, false)],
        );
        let p = desc.property("firstName").unwrap();
        assert!(p.is_readable());
        assert!(!p.is_writable());
        assert_eq!(p.tokens(), &["first", "name"]);
        assert!(desc.property("lastName").is_none());
        assert!(desc.type_ref().is_none());
    }
}
