//! Value-reader adapters
//!
//! A [`ValueReader`] exposes structured data that is not a described Rust
//! type (a parsed JSON tree, a row, a property bag) as a mappable source.
//! The engine materializes the source through the reader and describes the
//! resulting value exactly like a statically described type.

use std::any::{Any, TypeId};
use std::collections::BTreeMap;

use crate::value::Value;

/// Reads members out of external structured objects
pub trait ValueReader: Send + Sync + 'static {
    /// Whether this reader understands sources of type `source_type`
    fn supports(&self, source_type: TypeId) -> bool;

    /// Member names available on `source`, in a stable order
    fn member_names(&self, source: &dyn Any) -> Vec<String>;

    /// Value of `member` on `source`, `None` when absent
    fn get(&self, source: &dyn Any, member: &str) -> Option<Value>;

    /// Materialize `source` as an object value
    fn read(&self, source: &dyn Any) -> Value {
        let members: BTreeMap<String, Value> = self
            .member_names(source)
            .into_iter()
            .filter_map(|name| self.get(source, &name).map(|v| (name, v)))
            .collect();
        Value::Object(members)
    }

    /// Name used in diagnostics
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct PairReader;

    impl ValueReader for PairReader {
        fn supports(&self, source_type: TypeId) -> bool {
            source_type == TypeId::of::<HashMap<String, String>>()
        }

        fn member_names(&self, source: &dyn Any) -> Vec<String> {
            let mut names: Vec<String> = source
                .downcast_ref::<HashMap<String, String>>()
                .map(|m| m.keys().cloned().collect())
                .unwrap_or_default();
            names.sort();
            names
        }

        fn get(&self, source: &dyn Any, member: &str) -> Option<Value> {
            source
                .downcast_ref::<HashMap<String, String>>()
                .and_then(|m| m.get(member))
                .map(|v| Value::String(v.clone()))
        }
    }

    #[test]
    fn test_read_materializes_members() {
        let mut src = HashMap::new();
        src.insert("city".to_string(), "SF".to_string());
        src.insert("street".to_string(), "Main".to_string());

        let reader = PairReader;
        assert!(reader.supports(TypeId::of::<HashMap<String, String>>()));
        let v = reader.read(&src);
        assert_eq!(v.member("city"), Some(&Value::String("SF".into())));
        assert_eq!(v.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_read_of_unsupported_source_is_empty() {
        let v = PairReader.read(&42i32);
        assert_eq!(v, Value::Object(BTreeMap::new()));
    }
}
