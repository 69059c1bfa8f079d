//! Mapping from type identifiers to capabilities.
//!
//! The registry is assembled once through a [`RegistryBuilder`], seeded from
//! the built-in lattice and extended by providers, and is read-only after
//! [`RegistryBuilder::build`]. Every closure is precomputed there, so
//! resolution is a pure lookup over the current predicate values.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use super::capability::{BUILT_IN_DISJOINT, BUILT_IN_KINDS};
use super::{Capability, Iri, Vocabulary};
use crate::Result;

/// Outcome of resolving a set of type and kind identifiers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Union of the closures of every recognised type and kind component.
    pub capabilities: BTreeSet<Capability>,
    /// Type identifiers the registry has no capability for.
    pub unrecognized: BTreeSet<Iri>,
}

/// Process-wide, read-only capability table.
#[derive(Debug)]
pub struct CapabilityRegistry {
    vocabulary: Arc<Vocabulary>,
    types: HashMap<Iri, Capability>,
    type_iris: HashMap<Capability, Iri>,
    closures: HashMap<Capability, BTreeSet<Capability>>,
    kinds: HashMap<Iri, Iri>,
    disjoint: Vec<(Capability, Capability)>,
}

impl CapabilityRegistry {
    /// Starts a builder seeded with the built-in HQDM types of `vocabulary`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedIdentifier`] when the vocabulary
    /// namespace cannot host the built-in local names.
    pub fn builder(vocabulary: Vocabulary) -> Result<RegistryBuilder> {
        let mut builder = RegistryBuilder {
            vocabulary,
            types: HashMap::new(),
            extra_parents: HashMap::new(),
            kinds: HashMap::new(),
            disjoint: BUILT_IN_DISJOINT.to_vec(),
        };
        for capability in Capability::BUILT_IN {
            if let Some(name) = capability.hqdm_name() {
                let iri = builder.vocabulary.term(name)?;
                builder.types.insert(iri, *capability);
            }
        }
        for (kind, component) in BUILT_IN_KINDS {
            if let (Some(kind), Some(component)) = (kind.hqdm_name(), component.hqdm_name()) {
                let kind = builder.vocabulary.term(kind)?;
                let component = builder.vocabulary.term(component)?;
                builder.kinds.insert(kind, component);
            }
        }
        Ok(builder)
    }

    /// Registry holding only the built-in HQDM ontology.
    ///
    /// # Errors
    ///
    /// See [`Self::builder`].
    pub fn hqdm() -> Result<Arc<Self>> {
        Ok(Self::builder(Vocabulary::hqdm()?)?.build())
    }

    #[must_use]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Capability granted by a type identifier.
    #[must_use]
    pub fn capability_of(&self, type_iri: &Iri) -> Option<Capability> {
        self.types.get(type_iri).copied()
    }

    /// Type identifier registered for a capability.
    #[must_use]
    pub fn type_iri(&self, capability: Capability) -> Option<&Iri> {
        self.type_iris.get(&capability)
    }

    /// The capability itself plus every transitive supertype.
    #[must_use]
    pub fn closure(&self, capability: Capability) -> BTreeSet<Capability> {
        self.closures
            .get(&capability)
            .cloned()
            .unwrap_or_else(|| BTreeSet::from([capability]))
    }

    /// Component type declared for a kind, if `kind` is a registered kind.
    #[must_use]
    pub fn component_of(&self, kind: &Iri) -> Option<&Iri> {
        self.kinds.get(kind)
    }

    /// Number of registered type identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Resolves the capability set implied by `types` (values of the type
    /// predicate) and `kinds` (values of the kind membership predicate).
    ///
    /// The result depends only on the two input sets and the registry, never
    /// on the order in which values are supplied.
    pub fn resolve<'a, T, K>(&self, types: T, kinds: K) -> Resolution
    where
        T: IntoIterator<Item = &'a Iri>,
        K: IntoIterator<Item = &'a Iri>,
    {
        let mut resolution = Resolution::default();

        for type_iri in types {
            match self.capability_of(type_iri) {
                Some(capability) => resolution.capabilities.extend(self.closure(capability)),
                None => {
                    debug!(type_iri = %type_iri, "unrecognized_type");
                    resolution.unrecognized.insert(type_iri.clone());
                }
            }
        }

        for kind in kinds {
            resolution.capabilities.extend(self.kind_capabilities(kind));
        }

        resolution
    }

    /// Follows kind → component links until a component that is not itself a
    /// kind is reached, and returns the closure of that component.
    fn kind_capabilities(&self, kind: &Iri) -> BTreeSet<Capability> {
        let mut visited = HashSet::new();
        let mut current = self.kinds.get(kind);

        while let Some(component) = current {
            if !visited.insert(component) {
                debug!(kind = %kind, "cyclic_kind");
                break;
            }
            match self.kinds.get(component) {
                Some(next) => current = Some(next),
                None => {
                    return self
                        .capability_of(component)
                        .map(|capability| self.closure(capability))
                        .unwrap_or_default();
                }
            }
        }

        BTreeSet::new()
    }

    /// Finds a capability in `existing` that may not coexist with `requested`.
    #[must_use]
    pub fn conflict_with(
        &self,
        existing: &BTreeSet<Capability>,
        requested: Capability,
    ) -> Option<Capability> {
        let requested = self.closure(requested);
        self.disjoint.iter().find_map(|(left, right)| {
            if requested.contains(left) && existing.contains(right) {
                Some(*right)
            } else if requested.contains(right) && existing.contains(left) {
                Some(*left)
            } else {
                None
            }
        })
    }
}

/// Mutable stage of a [`CapabilityRegistry`], handed to extension providers.
#[derive(Debug)]
pub struct RegistryBuilder {
    vocabulary: Vocabulary,
    types: HashMap<Iri, Capability>,
    extra_parents: HashMap<Capability, Vec<Capability>>,
    kinds: HashMap<Iri, Iri>,
    disjoint: Vec<(Capability, Capability)>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Maps a type identifier to a capability. A later registration of the
    /// same identifier replaces the earlier one.
    pub fn register(&mut self, type_iri: Iri, capability: Capability) -> &mut Self {
        if let Some(previous) = self.types.insert(type_iri.clone(), capability) {
            debug!(type_iri = %type_iri, %previous, %capability, "type_reregistered");
        }
        self
    }

    /// Registers a capability together with its direct supertypes.
    pub fn register_with_parents(
        &mut self,
        type_iri: Iri,
        capability: Capability,
        parents: &[Capability],
    ) -> &mut Self {
        self.extra_parents
            .entry(capability)
            .or_default()
            .extend_from_slice(parents);
        self.register(type_iri, capability)
    }

    /// Declares `kind` as a classifier whose members are of `component` type.
    pub fn register_kind(&mut self, kind: Iri, component: Iri) -> &mut Self {
        self.kinds.insert(kind, component);
        self
    }

    /// Forbids a single entity from exposing both capabilities.
    pub fn declare_disjoint(&mut self, left: Capability, right: Capability) -> &mut Self {
        self.disjoint.push((left, right));
        self
    }

    fn parents_of(&self, capability: Capability) -> impl Iterator<Item = Capability> + '_ {
        capability.parents().iter().copied().chain(
            self.extra_parents
                .get(&capability)
                .into_iter()
                .flatten()
                .copied(),
        )
    }

    fn closure_of(&self, capability: Capability) -> BTreeSet<Capability> {
        let mut closure = BTreeSet::new();
        let mut pending = vec![capability];
        while let Some(current) = pending.pop() {
            if closure.insert(current) {
                pending.extend(self.parents_of(current));
            }
        }
        closure
    }

    /// Freezes the registry, computing every capability closure.
    #[must_use]
    pub fn build(self) -> Arc<CapabilityRegistry> {
        let capabilities: BTreeSet<Capability> = self
            .types
            .values()
            .copied()
            .chain(self.extra_parents.keys().copied())
            .collect();
        let closures: HashMap<Capability, BTreeSet<Capability>> = capabilities
            .into_iter()
            .map(|capability| (capability, self.closure_of(capability)))
            .collect();

        let mut type_iris = HashMap::new();
        for (iri, capability) in &self.types {
            // Several IRIs may share a capability; prefer the one in the namespace.
            let preferred = self.vocabulary.local_term(iri).is_some();
            type_iris
                .entry(*capability)
                .and_modify(|existing: &mut Iri| {
                    if preferred && self.vocabulary.local_term(existing).is_none() {
                        *existing = iri.clone();
                    }
                })
                .or_insert_with(|| iri.clone());
        }

        debug!(
            types = self.types.len(),
            kinds = self.kinds.len(),
            "capability_registry_built"
        );

        Arc::new(CapabilityRegistry {
            vocabulary: Arc::new(self.vocabulary),
            types: self.types,
            type_iris,
            closures,
            kinds: self.kinds,
            disjoint: self.disjoint,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rstest::rstest;

    use super::CapabilityRegistry;
    use crate::model::{Capability, Iri, Vocabulary};

    fn iri(text: &str) -> Iri {
        Iri::new(text).expect("valid iri")
    }

    fn hqdm(name: &str) -> Iri {
        Vocabulary::hqdm().expect("vocabulary").term(name).expect("term")
    }

    #[rstest]
    #[case(Capability::Person, Capability::Party)]
    #[case(Capability::Person, Capability::StateOfBiologicalObject)]
    #[case(Capability::Person, Capability::Thing)]
    #[case(Capability::Organization, Capability::System)]
    #[case(Capability::KindOfPerson, Capability::Class)]
    #[case(Capability::Composition, Capability::Relationship)]
    fn closure_contains_transitive_supertypes(
        #[case] capability: Capability,
        #[case] supertype: Capability,
    ) {
        let registry = CapabilityRegistry::hqdm().expect("registry");
        assert!(registry.closure(capability).contains(&supertype));
    }

    #[test]
    fn person_is_not_a_participant() {
        let registry = CapabilityRegistry::hqdm().expect("registry");
        let closure = registry.closure(Capability::Person);
        assert!(!closure.contains(&Capability::Participant));
        assert!(!closure.contains(&Capability::AbstractObject));
    }

    #[test]
    fn resolution_unions_types_and_records_unknown_ones() {
        let registry = CapabilityRegistry::hqdm().expect("registry");
        let unknown = iri("http://example.org/Widget");
        let types = [hqdm("person"), hqdm("participant"), unknown.clone()];

        let resolution = registry.resolve(types.iter(), std::iter::empty());

        assert!(resolution.capabilities.contains(&Capability::Person));
        assert!(resolution.capabilities.contains(&Capability::Participant));
        assert_eq!(resolution.unrecognized, BTreeSet::from([unknown]));
    }

    #[test]
    fn resolution_is_independent_of_input_order() {
        let registry = CapabilityRegistry::hqdm().expect("registry");
        let forward = [hqdm("person"), hqdm("association"), hqdm("participant")];
        let mut backward = forward.clone();
        backward.reverse();

        assert_eq!(
            registry.resolve(forward.iter(), std::iter::empty()),
            registry.resolve(backward.iter(), std::iter::empty())
        );
    }

    #[test]
    fn kind_membership_resolves_component_transitively() {
        let mut builder =
            CapabilityRegistry::builder(Vocabulary::hqdm().expect("vocabulary")).expect("builder");
        let employee = iri("http://example.org/KindOfEmployee");
        let manager = iri("http://example.org/KindOfManager");
        builder
            .register_kind(employee.clone(), hqdm("kind_of_person"))
            .register_kind(manager.clone(), employee);
        let registry = builder.build();

        let resolution = registry.resolve(std::iter::empty(), [&manager]);

        assert!(resolution.capabilities.contains(&Capability::Person));
        assert!(!resolution.capabilities.contains(&Capability::KindOfPerson));
    }

    #[test]
    fn cyclic_kinds_terminate() {
        let mut builder =
            CapabilityRegistry::builder(Vocabulary::hqdm().expect("vocabulary")).expect("builder");
        let left = iri("http://example.org/Left");
        let right = iri("http://example.org/Right");
        builder
            .register_kind(left.clone(), right.clone())
            .register_kind(right, left.clone());
        let registry = builder.build();

        assert!(registry
            .resolve(std::iter::empty(), [&left])
            .capabilities
            .is_empty());
    }

    #[test]
    fn custom_capabilities_inherit_declared_parents() {
        let mut builder =
            CapabilityRegistry::builder(Vocabulary::hqdm().expect("vocabulary")).expect("builder");
        let employee = Capability::Custom("Employee");
        builder.register_with_parents(
            iri("http://example.org/Employee"),
            employee,
            &[Capability::Person],
        );
        let registry = builder.build();

        let closure = registry.closure(employee);
        assert!(closure.contains(&Capability::Person));
        assert!(closure.contains(&Capability::Thing));
        assert_eq!(
            registry.type_iri(employee),
            Some(&iri("http://example.org/Employee"))
        );
    }

    #[test]
    fn abstract_and_spatio_temporal_capabilities_conflict() {
        let registry = CapabilityRegistry::hqdm().expect("registry");
        let existing = registry.closure(Capability::KindOfPerson);

        assert_eq!(
            registry.conflict_with(&existing, Capability::Person),
            Some(Capability::AbstractObject)
        );
        assert_eq!(registry.conflict_with(&existing, Capability::ClassOfClass), None);
    }
}
