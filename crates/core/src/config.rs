//! Mapper configuration
//!
//! [`Configuration`] is the snapshot consumed by descriptor construction,
//! matching, plan building and execution. It is cheap to clone and compares
//! by value: scalar options by equality, registered converters, readers and
//! factories by identity. Its [`fingerprint`](Configuration::fingerprint) is
//! part of every cache key.
//!
//! The scalar options can also be loaded from TOML through
//! [`MapperSettings`].

use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::convert::{Converter, ErasedConverter, Factory};
use crate::error::{Error, Result};
use crate::reader::ValueReader;
use crate::traits::{Describe, Mappable};
use crate::types::ValueType;

/// Default limit on nested members walked while building a plan
pub const DEFAULT_MAX_DEPTH: usize = 8;

// ============================================================================
// Options
// ============================================================================

/// Policy for comparing source and destination token sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingStrategy {
    /// Token sequences must be identical
    Exact,
    /// All destination tokens must match, in order; extra source tokens cost score
    #[default]
    Standard,
    /// Only the last destination token must match the last source token
    Loose,
}

/// Convention for splitting member names into tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameTokenizer {
    /// Split on case changes, letter/digit boundaries and separators
    #[default]
    CamelCase,
    /// Split on underscores only
    Underscore,
}

// ============================================================================
// MapperSettings
// ============================================================================

/// Scalar configuration options, loadable from TOML
///
/// # Example
///
/// ```toml
/// matching_strategy = "loose"
/// name_tokenizer = "camel_case"
/// field_access_enabled = true
/// max_depth = 8
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperSettings {
    /// Matching strategy: `"exact"`, `"standard"` (default) or `"loose"`
    #[serde(default)]
    pub matching_strategy: MatchingStrategy,
    /// Name tokenizer: `"camel_case"` (default) or `"underscore"`
    #[serde(default)]
    pub name_tokenizer: NameTokenizer,
    /// Let non-public members participate in mapping
    #[serde(default)]
    pub field_access_enabled: bool,
    /// Deepest member nesting walked while building a plan
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for MapperSettings {
    fn default() -> Self {
        Self {
            matching_strategy: MatchingStrategy::default(),
            name_tokenizer: NameTokenizer::default(),
            field_access_enabled: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl MapperSettings {
    /// Parse settings from TOML text
    ///
    /// # Errors
    ///
    /// Returns [`Error::Settings`] for malformed TOML, unknown option values
    /// or a zero `max_depth`.
    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: MapperSettings = toml::from_str(text)?;
        if settings.max_depth == 0 {
            return Err(Error::Settings("max_depth must be at least 1".to_string()));
        }
        Ok(settings)
    }

    /// Returns the default settings file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# modelmap configuration
#
# Matching strategy: "exact", "standard" (default) or "loose"
#   "exact"    = token sequences must be identical
#   "standard" = every destination token must match, in order
#   "loose"    = only the last destination token must match
matching_strategy = "standard"

# Name tokenizer: "camel_case" (default) or "underscore"
name_tokenizer = "camel_case"

# Let non-public members participate in mapping (default: false)
field_access_enabled = false

# Deepest member nesting walked while building a plan (default: 8)
max_depth = 8
"#
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Immutable-per-lookup configuration snapshot
#[derive(Clone)]
pub struct Configuration {
    matching_strategy: MatchingStrategy,
    name_tokenizer: NameTokenizer,
    field_access_enabled: bool,
    max_depth: usize,
    converters: Vec<Arc<ErasedConverter>>,
    value_readers: Vec<Arc<dyn ValueReader>>,
    factories: Vec<Arc<Factory>>,
}

/// Hashable identity of a [`Configuration`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigFingerprint {
    matching_strategy: MatchingStrategy,
    name_tokenizer: NameTokenizer,
    field_access_enabled: bool,
    max_depth: usize,
    registrations: Vec<usize>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::from_settings(&MapperSettings::default())
    }
}

impl Configuration {
    /// Default configuration: standard matching, camel case, no field access
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration carrying the given scalar settings
    pub fn from_settings(settings: &MapperSettings) -> Self {
        Configuration {
            matching_strategy: settings.matching_strategy,
            name_tokenizer: settings.name_tokenizer,
            field_access_enabled: settings.field_access_enabled,
            max_depth: settings.max_depth.max(1),
            converters: Vec::new(),
            value_readers: Vec::new(),
            factories: Vec::new(),
        }
    }

    /// Configuration loaded from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        MapperSettings::from_toml(text).map(|s| Self::from_settings(&s))
    }

    /// The scalar options of this configuration
    pub fn settings(&self) -> MapperSettings {
        MapperSettings {
            matching_strategy: self.matching_strategy,
            name_tokenizer: self.name_tokenizer,
            field_access_enabled: self.field_access_enabled,
            max_depth: self.max_depth,
        }
    }

    // ========================================================================
    // Builders
    // ========================================================================

    /// Builder: set the matching strategy
    pub fn with_matching_strategy(mut self, strategy: MatchingStrategy) -> Self {
        self.matching_strategy = strategy;
        self
    }

    /// Builder: set the name tokenizer
    pub fn with_name_tokenizer(mut self, tokenizer: NameTokenizer) -> Self {
        self.name_tokenizer = tokenizer;
        self
    }

    /// Builder: enable or disable field access
    pub fn with_field_access(mut self, enabled: bool) -> Self {
        self.field_access_enabled = enabled;
        self
    }

    /// Builder: set the maximum nesting depth (at least 1)
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    /// Builder: register a property-level converter
    ///
    /// Converters are consulted in registration order, before any built-in
    /// conversion, for mappings whose declared types match the converter's.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the converter's type pair cannot be
    /// inferred.
    pub fn with_converter<S, D, C>(mut self, converter: C) -> Result<Self>
    where
        S: Mappable,
        D: Mappable,
        C: Converter<S, D>,
    {
        self.converters.push(Arc::new(ErasedConverter::new(converter)?));
        Ok(self)
    }

    /// Builder: register a value reader
    pub fn with_value_reader<R: ValueReader>(mut self, reader: R) -> Self {
        self.value_readers.push(Arc::new(reader));
        self
    }

    /// Builder: register a factory used instead of `Default` for `T`
    pub fn with_factory<T, F>(mut self, factory: F) -> Self
    where
        T: Describe,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.factories.push(Arc::new(Factory::new(factory)));
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Matching strategy
    pub fn matching_strategy(&self) -> MatchingStrategy {
        self.matching_strategy
    }

    /// Name tokenizer
    pub fn name_tokenizer(&self) -> NameTokenizer {
        self.name_tokenizer
    }

    /// Whether non-public members participate in mapping
    pub fn is_field_access_enabled(&self) -> bool {
        self.field_access_enabled
    }

    /// Maximum nesting depth walked while building a plan
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Registered converters, in registration order
    pub fn converters(&self) -> &[Arc<ErasedConverter>] {
        &self.converters
    }

    /// Registered value readers, in registration order
    pub fn value_readers(&self) -> &[Arc<dyn ValueReader>] {
        &self.value_readers
    }

    /// First converter declared for `source -> destination`
    pub fn converter_for(
        &self,
        source: &ValueType,
        destination: &ValueType,
    ) -> Option<&Arc<ErasedConverter>> {
        self.converters
            .iter()
            .find(|c| c.supports(source, destination))
    }

    /// First value reader supporting sources of type `source_type`
    pub fn reader_for(&self, source_type: TypeId) -> Option<&Arc<dyn ValueReader>> {
        self.value_readers
            .iter()
            .find(|r| r.supports(source_type))
    }

    /// Factory registered for `type_id`, the last registration winning
    pub fn factory_for(&self, type_id: TypeId) -> Option<&Arc<Factory>> {
        self.factories
            .iter()
            .rev()
            .find(|f| f.type_id() == type_id)
    }

    /// Hashable identity used in cache keys
    pub fn fingerprint(&self) -> ConfigFingerprint {
        let registrations = self
            .converters
            .iter()
            .map(|c| Arc::as_ptr(c) as *const () as usize)
            .chain(
                self.value_readers
                    .iter()
                    .map(|r| Arc::as_ptr(r) as *const () as usize),
            )
            .chain(
                self.factories
                    .iter()
                    .map(|f| Arc::as_ptr(f) as *const () as usize),
            )
            .collect();
        ConfigFingerprint {
            matching_strategy: self.matching_strategy,
            name_tokenizer: self.name_tokenizer,
            field_access_enabled: self.field_access_enabled,
            max_depth: self.max_depth,
            registrations,
        }
    }
}

impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint() == other.fingerprint()
    }
}

impl Eq for Configuration {}

impl Hash for Configuration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fingerprint().hash(state);
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("matching_strategy", &self.matching_strategy)
            .field("name_tokenizer", &self.name_tokenizer)
            .field("field_access_enabled", &self.field_access_enabled)
            .field("max_depth", &self.max_depth)
            .field("converters", &self.converters.len())
            .field("value_readers", &self.value_readers.len())
            .field("factories", &self.factories.len())
            .finish()
    }
}
