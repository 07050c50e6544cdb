//! TypeMap validation
//!
//! A TypeMap is valid when every writable destination leaf has exactly one
//! source, or when a global converter handles the whole mapping. Issues are
//! collected across all TypeMaps and raised together.

use std::sync::Arc;

use modelmap_core::{Error, Result, ValidationIssue};

use crate::typemap::TypeMap;

/// Issues of one TypeMap, unmapped before ambiguous
pub fn validate(type_map: &TypeMap) -> Vec<ValidationIssue> {
    if type_map.has_converter() {
        return Vec::new();
    }

    let name = type_map.key().to_string();
    let unmapped = type_map
        .unmapped()
        .iter()
        .map(|path| ValidationIssue::Unmapped {
            type_map: name.clone(),
            path: path.to_string(),
        });
    let ambiguous = type_map
        .ambiguities()
        .iter()
        .map(|a| ValidationIssue::Ambiguous {
            type_map: name.clone(),
            path: a.destination.to_string(),
            candidates: a.candidates.iter().map(ToString::to_string).collect(),
        });
    unmapped.chain(ambiguous).collect()
}

/// Validate every TypeMap, failing with all issues found
///
/// # Errors
///
/// Returns [`Error::Validation`] listing every issue, in TypeMap order.
pub fn validate_all<'a, I>(type_maps: I) -> Result<()>
where
    I: IntoIterator<Item = &'a Arc<TypeMap>>,
{
    let issues: Vec<ValidationIssue> = type_maps
        .into_iter()
        .flat_map(|tm| validate(tm))
        .collect();
    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(issues))
    }
}
