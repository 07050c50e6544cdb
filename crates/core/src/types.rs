//! Declared types and type identities
//!
//! - ValueType: the declared type of a member
//! - TypeRef: identity and introspection hooks of a describable type
//! - EnumType: identity and variant names of a fieldless enumeration
//! - Member: one entry of a type's member list
//! - TypeKey: identity used for TypeMap keys

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::traits::{Describe, Mappable};
use crate::value::Value;

// ============================================================================
// TypeRef
// ============================================================================

/// Static identity of a describable type plus its introspection hooks
///
/// A `TypeRef` is cheap to copy and never evaluates its hooks eagerly, so
/// self-referential types can name themselves in their own member lists.
///
/// Wrapper types (`Box<T>`, `Arc<T>`) report a `TypeRef` that forwards to
/// `T`. Call [`TypeRef::canonical`] before using the identity as a cache key.
#[derive(Clone, Copy)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
    members: fn() -> Vec<Member>,
    instantiate: fn() -> Value,
    wrapped: Option<fn() -> ValueType>,
}

impl TypeRef {
    /// TypeRef of a describable type
    pub fn of<T: Describe>() -> Self {
        TypeRef {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            members: T::members,
            instantiate: T::instantiate,
            wrapped: None,
        }
    }

    /// TypeRef of wrapper `W` around the describable `inner`
    ///
    /// The wrapper forwards members and instantiation to `inner`, and
    /// [`canonical`](Self::canonical) resolves it back to `inner`.
    pub fn wrapper<W: 'static, T: Mappable>(inner: TypeRef) -> Self {
        TypeRef {
            id: TypeId::of::<W>(),
            name: type_name::<W>(),
            members: inner.members,
            instantiate: inner.instantiate,
            wrapped: Some(T::value_type),
        }
    }

    /// Runtime type identity
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without the module path
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.name)
    }

    /// Enumerate the declared members, in declaration order
    pub fn members(&self) -> Vec<Member> {
        (self.members)()
    }

    /// Build a default instance (the no-argument constructor)
    pub fn instantiate(&self) -> Value {
        (self.instantiate)()
    }

    /// Whether this TypeRef wraps another type
    pub fn is_wrapper(&self) -> bool {
        self.wrapped.is_some()
    }

    /// Strip wrapper layers until the declared type is reached
    pub fn canonical(&self) -> TypeRef {
        let mut current = *self;
        while let Some(inner) = current.wrapped {
            match inner() {
                ValueType::Object(next) => current = next,
                _ => break,
            }
        }
        current
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self.name)
    }
}

// ============================================================================
// EnumType
// ============================================================================

/// Identity and variant names of a fieldless enumeration
#[derive(Clone, Copy)]
pub struct EnumType {
    id: TypeId,
    name: &'static str,
    variants: &'static [&'static str],
}

impl EnumType {
    /// Describe enumeration `T` with the given variant names
    pub fn new<T: 'static>(variants: &'static [&'static str]) -> Self {
        EnumType {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            variants,
        }
    }

    /// Runtime type identity
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Variant names in declaration order
    pub fn variants(&self) -> &'static [&'static str] {
        self.variants
    }

    /// Whether `variant` names one of the variants
    pub fn has_variant(&self, variant: &str) -> bool {
        self.variants.iter().any(|v| *v == variant)
    }
}

impl PartialEq for EnumType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EnumType {}

impl Hash for EnumType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EnumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnumType({})", self.name)
    }
}

// ============================================================================
// ValueType
// ============================================================================

/// Declared type of a member
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Boolean
    Bool,
    /// Any integer type
    Int,
    /// Any floating point type
    Float,
    /// Strings
    String,
    /// Fieldless enumeration, carried by variant name
    Enum(EnumType),
    /// Sequence of elements
    List(Box<ValueType>),
    /// Key/value container
    Map(Box<ValueType>, Box<ValueType>),
    /// Describable structured type
    Object(TypeRef),
    /// Shape only known from an instance (value-reader sources)
    Dynamic,
}

impl ValueType {
    /// The referenced type if this is an Object, with wrappers stripped
    pub fn object(&self) -> Option<TypeRef> {
        match self {
            ValueType::Object(t) => Some(t.canonical()),
            _ => None,
        }
    }

    /// Whether values of this type are scalars (bool, numbers, strings, enums)
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            ValueType::Bool | ValueType::Int | ValueType::Float | ValueType::String | ValueType::Enum(_)
        )
    }

    /// Same declared type once wrappers are stripped
    pub fn same_as(&self, other: &ValueType) -> bool {
        match (self, other) {
            (ValueType::Object(a), ValueType::Object(b)) => a.canonical() == b.canonical(),
            (ValueType::List(a), ValueType::List(b)) => a.same_as(b),
            (ValueType::Map(ak, av), ValueType::Map(bk, bv)) => ak.same_as(bk) && av.same_as(bv),
            _ => self == other,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Bool => write!(f, "bool"),
            ValueType::Int => write!(f, "int"),
            ValueType::Float => write!(f, "float"),
            ValueType::String => write!(f, "string"),
            ValueType::Enum(e) => write!(f, "enum {}", short_type_name(e.name())),
            ValueType::List(elem) => write!(f, "list<{}>", elem),
            ValueType::Map(k, v) => write!(f, "map<{}, {}>", k, v),
            ValueType::Object(t) => write!(f, "{}", t.canonical().short_name()),
            ValueType::Dynamic => write!(f, "dynamic"),
        }
    }
}

// ============================================================================
// Member
// ============================================================================

/// How a member is exposed by its declaring type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// Publicly accessible member
    Accessor,
    /// Non-public member, mappable only when field access is enabled
    Field,
}

impl Access {
    /// Classify a member by its visibility tokens (`""`, `"pub"`, `"pub(crate)"`, ...)
    pub fn from_visibility(visibility: &str) -> Self {
        if visibility.trim().is_empty() {
            Access::Field
        } else {
            Access::Accessor
        }
    }
}

/// One declared member of a describable type
#[derive(Debug, Clone)]
pub struct Member {
    /// Member name
    pub name: &'static str,
    /// Declared type
    pub value_type: ValueType,
    /// Exposure of the member
    pub access: Access,
    /// Whether the member can be read
    pub readable: bool,
    /// Whether the member can be written
    pub writable: bool,
}

impl Member {
    /// A readable and writable member
    pub fn new(name: &'static str, value_type: ValueType, access: Access) -> Self {
        Member {
            name,
            value_type,
            access,
            readable: true,
            writable: true,
        }
    }

    /// Builder: mark the member read-only
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }
}

// ============================================================================
// TypeKey
// ============================================================================

/// Identity of a mapped type, canonicalized
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Identity of `T` with wrapper layers stripped
    pub fn of<T: Mappable>() -> Self {
        match T::value_type() {
            ValueType::Object(t) => TypeKey::from(t),
            ValueType::Enum(e) => TypeKey {
                id: e.id(),
                name: e.name(),
            },
            _ => TypeKey::raw::<T>(),
        }
    }

    /// Identity of `T` without inspecting its declared type
    pub fn raw<T: 'static>() -> Self {
        TypeKey {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Runtime type identity
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without the module path
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.name)
    }
}

impl From<TypeRef> for TypeKey {
    fn from(t: TypeRef) -> Self {
        let c = t.canonical();
        TypeKey {
            id: c.id(),
            name: c.name(),
        }
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Strip the module path from a type name, keeping generic arguments intact
pub fn short_type_name(name: &'static str) -> &'static str {
    let head = name.split('<').next().unwrap_or(name);
    match head.rfind("::") {
        Some(idx) => &name[idx + 2..],
        None => name,
    }
}
