//! TypeMap builder
//!
//! Infers the mappings of a new TypeMap from member names.
//!
//! ## Algorithm
//!
//! 1. Walk the source graph from the root and collect every readable member
//!    path as a candidate, with one token sequence per step.
//! 2. Walk the destination graph from the root over writable members.
//!    Scalars, enums, lists, maps and dynamic members are leaves. An object
//!    member is a leaf only when a candidate of the same type (or one a
//!    registered or configured converter accepts) matches it; otherwise the
//!    walk descends
//!    into its members, extending the destination path and its tokens.
//! 3. For each leaf, score the candidates whose type converts to the leaf's
//!    type. A unique best candidate becomes a mapping; a tie is recorded as
//!    an ambiguity; no match is recorded as an unmapped leaf.
//! 4. Merge explicit overrides: each replaces whatever was found at or below
//!    its destination path.
//!
//! Both walks keep a stack of the types on the current path and never
//! descend into a type already on it, and stop at the configured maximum
//! depth. An object leaf reached that way falls back to any convertible
//! object candidate, which the engine maps through a nested TypeMap.

use std::any::TypeId;
use std::sync::Arc;
use tracing::{debug, warn};

use modelmap_core::{
    Configuration, Error, PropertyPath, Result, Token, TypeDescriptor, TypeRef, ValueType,
};
use modelmap_matching::{best, Outcome};

use crate::property_map::ExplicitMapping;
use crate::registry::DescriptorRegistry;
use crate::store::TypeMapStore;
use crate::typemap::{path_of, Ambiguity, Mapping, PathStep, TypeMap, TypeMapKey};

/// A readable source path
#[derive(Debug, Clone)]
struct Candidate {
    steps: Vec<PathStep>,
    tokens: Vec<Vec<Token>>,
    value_type: ValueType,
    /// Reader-derived object member
    structured: bool,
}

#[derive(Debug, Default)]
struct Plan {
    mappings: Vec<Mapping>,
    unmapped: Vec<PropertyPath>,
    ambiguities: Vec<Ambiguity>,
}

/// Builds TypeMaps against one configuration
pub struct TypeMapBuilder<'a> {
    registry: &'a DescriptorRegistry,
    config: &'a Configuration,
    store: Option<&'a TypeMapStore>,
}

impl<'a> TypeMapBuilder<'a> {
    /// Builder describing types through `registry` under `config`
    pub fn new(registry: &'a DescriptorRegistry, config: &'a Configuration) -> Self {
        TypeMapBuilder {
            registry,
            config,
            store: None,
        }
    }

    /// Builder: also honor converters registered in `store`
    pub fn with_store(mut self, store: &'a TypeMapStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the TypeMap `key` from `source` to `destination`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the destination cannot be described
    /// or an override path does not resolve. Unmatched and ambiguous leaves
    /// are recorded on the TypeMap, never raised.
    pub fn build(
        &self,
        key: TypeMapKey,
        source: &Arc<TypeDescriptor>,
        destination: TypeRef,
        overrides: &[ExplicitMapping],
    ) -> Result<TypeMap> {
        let destination = destination.canonical();

        let mut candidates = Vec::new();
        let mut visited: Vec<TypeId> = source.type_ref().map(|t| t.id()).into_iter().collect();
        self.collect_sources(source, &[], &[], &mut visited, &mut candidates);

        let dest_descriptor = self.registry.describe(destination, None, self.config)?;
        let mut plan = Plan::default();
        let mut visited = vec![destination.id()];
        self.walk_destination(&dest_descriptor, &[], &[], &mut visited, &candidates, &mut plan);

        for explicit in overrides {
            self.merge_override(&mut plan, source, &dest_descriptor, explicit)?;
        }

        plan.mappings
            .sort_by(|a, b| a.destination_path().cmp(&b.destination_path()));
        plan.unmapped.sort();
        plan.ambiguities
            .sort_by(|a, b| a.destination.cmp(&b.destination));

        if !plan.ambiguities.is_empty() {
            warn!(
                type_map = %key,
                ambiguous = plan.ambiguities.len(),
                "TypeMap has ambiguous destination properties"
            );
        }
        debug!(
            type_map = %key,
            candidates = candidates.len(),
            mappings = plan.mappings.len(),
            unmapped = plan.unmapped.len(),
            "Built TypeMap"
        );

        Ok(TypeMap::new(
            key,
            ValueType::Object(destination),
            self.config.clone(),
            plan.mappings,
            plan.unmapped,
            plan.ambiguities,
        ))
    }

    // ========================================================================
    // Source walk
    // ========================================================================

    fn collect_sources(
        &self,
        descriptor: &TypeDescriptor,
        prefix: &[PathStep],
        prefix_tokens: &[Vec<Token>],
        visited: &mut Vec<TypeId>,
        out: &mut Vec<Candidate>,
    ) {
        for property in descriptor.properties() {
            if !property.is_readable() {
                continue;
            }
            let mut steps = prefix.to_vec();
            steps.push(PathStep::new(property.name(), property.value_type().clone()));
            let mut tokens = prefix_tokens.to_vec();
            tokens.push(property.tokens().to_vec());

            out.push(Candidate {
                steps: steps.clone(),
                tokens: tokens.clone(),
                value_type: property.value_type().clone(),
                structured: property.nested().is_some(),
            });

            if steps.len() >= self.config.max_depth() {
                continue;
            }
            if let Some(nested) = property.nested() {
                self.collect_sources(nested, &steps, &tokens, visited, out);
            } else if let Some(nested_type) = property.value_type().object() {
                if visited.contains(&nested_type.id()) {
                    continue;
                }
                let Some(nested) = self.describe_nested(nested_type, descriptor) else {
                    continue;
                };
                visited.push(nested_type.id());
                self.collect_sources(&nested, &steps, &tokens, visited, out);
                visited.pop();
            }
        }
    }

    // ========================================================================
    // Destination walk
    // ========================================================================

    fn walk_destination(
        &self,
        descriptor: &TypeDescriptor,
        prefix: &[PathStep],
        prefix_tokens: &[Token],
        visited: &mut Vec<TypeId>,
        candidates: &[Candidate],
        plan: &mut Plan,
    ) {
        for property in descriptor.properties() {
            if !property.is_writable() {
                continue;
            }
            let dest_type = property.value_type();
            let mut path = prefix.to_vec();
            path.push(PathStep::new(property.name(), dest_type.clone()));
            let mut tokens = prefix_tokens.to_vec();
            tokens.extend(property.tokens().iter().cloned());

            let viable: Vec<&Candidate> = candidates
                .iter()
                .filter(|c| self.is_convertible(c, dest_type))
                .collect();

            let Some(nested_type) = dest_type.object() else {
                self.match_leaf(&path, &tokens, &viable, plan);
                continue;
            };

            let assignable: Vec<&Candidate> = viable
                .iter()
                .copied()
                .filter(|c| self.is_assignable_object(c, dest_type))
                .collect();
            match self.outcome(&tokens, &assignable) {
                Outcome::Unmatched => {}
                outcome => {
                    self.record(&path, &assignable, outcome, plan);
                    continue;
                }
            }

            let descend = !visited.contains(&nested_type.id())
                && path.len() < self.config.max_depth();
            let nested = if descend {
                self.describe_nested(nested_type, descriptor)
            } else {
                None
            };

            match nested {
                Some(nested) => {
                    visited.push(nested_type.id());
                    self.walk_destination(&nested, &path, &tokens, visited, candidates, plan);
                    visited.pop();
                }
                None => self.match_leaf(&path, &tokens, &viable, plan),
            }
        }
    }

    fn match_leaf(
        &self,
        path: &[PathStep],
        tokens: &[Token],
        viable: &[&Candidate],
        plan: &mut Plan,
    ) {
        let outcome = self.outcome(tokens, viable);
        self.record(path, viable, outcome, plan);
    }

    fn outcome(&self, tokens: &[Token], candidates: &[&Candidate]) -> Outcome {
        best(
            candidates.iter().map(|c| c.tokens.as_slice()),
            tokens,
            self.config.matching_strategy(),
        )
    }

    fn record(&self, path: &[PathStep], candidates: &[&Candidate], outcome: Outcome, plan: &mut Plan) {
        match outcome {
            Outcome::Unique(i) => plan
                .mappings
                .push(Mapping::implicit(candidates[i].steps.clone(), path.to_vec())),
            Outcome::Ambiguous(indices) => plan.ambiguities.push(Ambiguity {
                destination: path_of(path),
                candidates: indices.iter().map(|&i| path_of(&candidates[i].steps)).collect(),
            }),
            Outcome::Unmatched => plan.unmapped.push(path_of(path)),
        }
    }

    fn describe_nested(
        &self,
        nested_type: TypeRef,
        parent: &TypeDescriptor,
    ) -> Option<Arc<TypeDescriptor>> {
        match self.registry.describe(nested_type, parent.type_ref(), self.config) {
            Ok(nested) => Some(nested),
            Err(e) => {
                debug!(type_name = nested_type.short_name(), error = %e, "Not descending into member type");
                None
            }
        }
    }

    // ========================================================================
    // Type compatibility
    // ========================================================================

    fn is_convertible(&self, candidate: &Candidate, destination: &ValueType) -> bool {
        if candidate.structured {
            return matches!(destination, ValueType::Object(_) | ValueType::Dynamic);
        }
        self.has_registered_converter(&candidate.value_type, destination)
            || convertible(&candidate.value_type, destination, self.config)
    }

    fn is_assignable_object(&self, candidate: &Candidate, destination: &ValueType) -> bool {
        !candidate.structured
            && (candidate.value_type.same_as(destination)
                || self
                    .config
                    .converter_for(&candidate.value_type, destination)
                    .is_some()
                || self.has_registered_converter(&candidate.value_type, destination))
    }

    fn has_registered_converter(&self, source: &ValueType, destination: &ValueType) -> bool {
        self.store
            .is_some_and(|store| store.converter_for(source, destination).is_some())
    }

    // ========================================================================
    // Overrides
    // ========================================================================

    fn merge_override(
        &self,
        plan: &mut Plan,
        source: &Arc<TypeDescriptor>,
        destination: &Arc<TypeDescriptor>,
        explicit: &ExplicitMapping,
    ) -> Result<()> {
        let source_steps = self.resolve_path(source, explicit.source(), false)?;
        let dest_steps = self.resolve_path(destination, explicit.destination(), true)?;
        let dest_path = explicit.destination();

        plan.mappings
            .retain(|m| !m.destination_path().starts_with(dest_path));
        plan.unmapped.retain(|p| !p.starts_with(dest_path));
        plan.ambiguities
            .retain(|a| !a.destination.starts_with(dest_path));
        plan.mappings.push(Mapping::explicit(
            source_steps,
            dest_steps,
            explicit.converter().cloned(),
        ));
        Ok(())
    }

    /// Resolve a dotted path against a descriptor, member by member
    fn resolve_path(
        &self,
        root: &Arc<TypeDescriptor>,
        path: &PropertyPath,
        writing: bool,
    ) -> Result<Vec<PathStep>> {
        let invalid = || Error::InvalidPath {
            path: path.to_string(),
            type_name: root.type_name().to_string(),
        };

        let segments = path.segments();
        let mut current = Arc::clone(root);
        let mut steps = Vec::with_capacity(segments.len());

        for (i, segment) in segments.iter().enumerate() {
            let last = i + 1 == segments.len();
            let property = current.property(segment).ok_or_else(invalid)?.clone();
            let usable = if writing {
                !last || property.is_writable()
            } else {
                property.is_readable()
            };
            if !usable {
                return Err(invalid());
            }
            steps.push(PathStep::new(property.name(), property.value_type().clone()));

            if !last {
                current = match (property.nested(), property.value_type().object()) {
                    (Some(nested), _) => Arc::clone(nested),
                    (None, Some(nested_type)) => {
                        self.registry
                            .describe(nested_type, current.type_ref(), self.config)?
                    }
                    (None, None) => return Err(invalid()),
                };
            }
        }

        if steps.is_empty() {
            return Err(invalid());
        }
        Ok(steps)
    }
}

/// Whether values declared `source` can be converted to `destination`
pub fn convertible(source: &ValueType, destination: &ValueType, config: &Configuration) -> bool {
    if config.converter_for(source, destination).is_some() || source.same_as(destination) {
        return true;
    }
    match (source, destination) {
        (ValueType::Dynamic, _) | (_, ValueType::Dynamic) => true,
        (ValueType::Int | ValueType::Float, ValueType::Int | ValueType::Float) => true,
        (s, ValueType::String) => s.is_scalar(),
        (ValueType::String, ValueType::Int | ValueType::Float | ValueType::Bool | ValueType::Enum(_)) => {
            true
        }
        (ValueType::Enum(_), ValueType::Enum(_)) => true,
        (ValueType::List(s), ValueType::List(d)) => convertible(s, d, config),
        (ValueType::Map(sk, sv), ValueType::Map(dk, dv)) => {
            convertible(sk, dk, config) && convertible(sv, dv, config)
        }
        (ValueType::Object(_), ValueType::Object(_)) => true,
        _ => false,
    }
}
