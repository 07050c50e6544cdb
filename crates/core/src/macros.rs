//! Declarative generators for the type-description provider
//!
//! `mappable!` wraps a struct definition and implements [`Mappable`] and
//! [`Describe`] for it. Members declared `pub` (any form) are accessors;
//! members without a visibility are fields and only participate in mapping
//! when field access is enabled. The struct must implement `Default`, which
//! serves as its no-argument constructor.
//!
//! `mappable_enum!` does the same for fieldless enums, which travel as their
//! variant name.
//!
//! [`Mappable`]: crate::Mappable
//! [`Describe`]: crate::Describe

/// Define a struct that can be mapped from and to
///
/// # Example
///
/// ```
/// use modelmap_core::{mappable, Describe, Access};
///
/// mappable! {
///     #[derive(Debug, Clone, Default, PartialEq)]
///     pub struct Address {
///         pub street: String,
///         city: String,
///     }
/// }
///
/// let members = Address::members();
/// assert_eq!(members[0].name, "street");
/// assert_eq!(members[1].access, Access::Field);
/// ```
#[macro_export]
macro_rules! mappable {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $fty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field : $fty,
            )*
        }

        impl $crate::Mappable for $name {
            fn value_type() -> $crate::ValueType {
                $crate::ValueType::Object($crate::TypeRef::of::<Self>())
            }

            fn to_value(&self) -> $crate::Value {
                #[allow(unused_mut)]
                let mut members = ::std::collections::BTreeMap::new();
                $(
                    members.insert(
                        ::std::string::String::from(stringify!($field)),
                        $crate::Mappable::to_value(&self.$field),
                    );
                )*
                $crate::Value::Object(members)
            }

            fn from_value(value: $crate::Value) -> $crate::Result<Self> {
                #[allow(unused_mut, unused_variables)]
                let mut members = $crate::value::expect_object(value, stringify!($name))?;
                #[allow(unused_mut)]
                let mut out = <Self as ::std::default::Default>::default();
                $(
                    if let Some(v) = members.remove(stringify!($field)) {
                        out.$field = <$fty as $crate::Mappable>::from_value(v)?;
                    }
                )*
                Ok(out)
            }
        }

        impl $crate::Describe for $name {
            fn members() -> ::std::vec::Vec<$crate::Member> {
                vec![
                    $(
                        $crate::Member::new(
                            stringify!($field),
                            <$fty as $crate::Mappable>::value_type(),
                            $crate::Access::from_visibility(stringify!($fvis)),
                        ),
                    )*
                ]
            }

            fn instantiate() -> $crate::Value {
                $crate::Mappable::to_value(&<Self as ::std::default::Default>::default())
            }
        }
    };
}

/// Define a fieldless enum that maps by variant name
///
/// # Example
///
/// ```
/// use modelmap_core::{mappable_enum, Mappable, Value};
///
/// mappable_enum! {
///     #[derive(Debug, Clone, Copy, Default, PartialEq)]
///     pub enum Status {
///         #[default]
///         Active,
///         Closed,
///     }
/// }
///
/// assert_eq!(Status::Closed.to_value(), Value::String("Closed".into()));
/// assert_eq!(Status::from_value(Value::String("Active".into())).unwrap(), Status::Active);
/// ```
#[macro_export]
macro_rules! mappable_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )*
        }

        impl $crate::Mappable for $name {
            fn value_type() -> $crate::ValueType {
                $crate::ValueType::Enum($crate::EnumType::new::<Self>(&[$(stringify!($variant)),*]))
            }

            fn to_value(&self) -> $crate::Value {
                match self {
                    $( $name::$variant => $crate::Value::String(stringify!($variant).to_string()), )*
                }
            }

            fn from_value(value: $crate::Value) -> $crate::Result<Self> {
                match value {
                    $crate::Value::String(s) => match s.as_str() {
                        $( stringify!($variant) => Ok($name::$variant), )*
                        other => Err($crate::Error::InvalidValue {
                            expected: stringify!($name).to_string(),
                            found: format!("unknown variant '{}'", other),
                        }),
                    },
                    other => Err($crate::Error::InvalidValue {
                        expected: stringify!($name).to_string(),
                        found: other.type_name().to_string(),
                    }),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{Access, Describe, Mappable, Value, ValueType};

    mappable! {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct Point {
            pub x: i64,
            pub y: i64,
            label: Option<String>,
        }
    }

    mappable! {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct Node {
            pub name: String,
            pub parent: Option<Box<Node>>,
            pub children: Vec<Node>,
        }
    }

    mappable_enum! {
        #[derive(Debug, Clone, Copy, Default, PartialEq)]
        pub enum Color {
            #[default]
            Red,
            Green,
        }
    }

    #[test]
    fn test_members_in_declaration_order() {
        let members = Point::members();
        let names: Vec<_> = members.iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["x", "y", "label"]);
        assert_eq!(members[0].access, Access::Accessor);
        assert_eq!(members[2].access, Access::Field);
        assert_eq!(members[2].value_type, ValueType::String);
    }

    #[test]
    fn test_struct_value_round_trip() {
        let p = Point {
            x: 1,
            y: 2,
            label: Some("a".into()),
        };
        let v = p.to_value();
        assert_eq!(v.member("x"), Some(&Value::Int(1)));
        assert_eq!(Point::from_value(v).unwrap(), p);
    }

    #[test]
    fn test_missing_members_keep_defaults() {
        let v = Value::object([("y", Value::Int(9))]);
        let p = Point::from_value(v).unwrap();
        assert_eq!(p.x, 0);
        assert_eq!(p.y, 9);
    }

    #[test]
    fn test_instantiate_is_default_value() {
        assert_eq!(Point::instantiate(), Point::default().to_value());
    }

    #[test]
    fn test_self_referential_type_describes_lazily() {
        let members = Node::members();
        let parent = members[1].value_type.object().unwrap();
        assert_eq!(parent, Node::type_ref());
        assert!(matches!(members[2].value_type, ValueType::List(_)));
    }

    #[test]
    fn test_enum_by_name() {
        assert_eq!(Color::Green.to_value(), Value::String("Green".into()));
        assert!(Color::from_value(Value::String("Blue".into())).is_err());
        match Color::value_type() {
            ValueType::Enum(e) => assert_eq!(e.variants(), &["Red", "Green"]),
            other => panic!("unexpected {:?}", other),
        }
    }
}
