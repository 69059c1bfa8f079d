use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};

use super::{Capability, CapabilityRegistry, Iri, Predicates, Value};

/// A node of the graph: an identifier, its predicates, and the capabilities
/// those predicates currently imply.
///
/// Two entities are the same entity when their identifiers match, whatever
/// their predicates hold. Every mutation of a capability-bearing predicate
/// re-derives the capability set before returning.
#[derive(Clone)]
pub struct Entity {
    id: Iri,
    predicates: Predicates,
    capabilities: BTreeSet<Capability>,
    unrecognized: BTreeSet<Iri>,
    registry: Arc<CapabilityRegistry>,
}

impl Entity {
    /// Creates a bare entity with no predicates and no capabilities.
    #[must_use]
    pub fn new(id: Iri, registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            id,
            predicates: Predicates::new(),
            capabilities: BTreeSet::new(),
            unrecognized: BTreeSet::new(),
            registry,
        }
    }

    /// Creates an entity holding `predicates`, resolving its capabilities.
    #[must_use]
    pub fn with_predicates(
        id: Iri,
        predicates: Predicates,
        registry: Arc<CapabilityRegistry>,
    ) -> Self {
        let mut entity = Self {
            id,
            predicates,
            capabilities: BTreeSet::new(),
            unrecognized: BTreeSet::new(),
            registry,
        };
        entity.rederive();
        entity
    }

    #[must_use]
    pub fn id(&self) -> &Iri {
        &self.id
    }

    #[must_use]
    pub fn predicates(&self) -> &Predicates {
        &self.predicates
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    /// Current capability set.
    #[must_use]
    pub fn capabilities(&self) -> &BTreeSet<Capability> {
        &self.capabilities
    }

    #[must_use]
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Type values the registry did not recognise. They stay stored as
    /// ordinary predicate values.
    #[must_use]
    pub fn unrecognized_types(&self) -> &BTreeSet<Iri> {
        &self.unrecognized
    }

    /// Values of the type predicate that are references.
    pub fn types(&self) -> impl Iterator<Item = &Iri> {
        self.predicates
            .references(self.registry.vocabulary().rdf_type())
    }

    pub fn add_value(&mut self, predicate: Iri, value: Value) -> bool {
        let bearing = self.registry.vocabulary().is_capability_bearing(&predicate);
        let added = self.predicates.add_value(predicate, value);
        if added && bearing {
            self.rederive();
        }
        added
    }

    pub fn remove_value(&mut self, predicate: &Iri, value: &Value) -> bool {
        let removed = self.predicates.remove_value(predicate, value);
        if removed && self.registry.vocabulary().is_capability_bearing(predicate) {
            self.rederive();
        }
        removed
    }

    #[must_use]
    pub fn has_value(&self, predicate: &Iri) -> bool {
        self.predicates.has_value(predicate)
    }

    #[must_use]
    pub fn has_this_value(&self, predicate: &Iri, value: &Value) -> bool {
        self.predicates.has_this_value(predicate, value)
    }

    #[must_use]
    pub fn value(&self, predicate: &Iri) -> BTreeSet<Value> {
        self.predicates.value(predicate)
    }

    /// Adds a type value, i.e. `rdf:type` → `type_iri`.
    pub fn add_type(&mut self, type_iri: Iri) -> bool {
        let predicate = self.registry.vocabulary().rdf_type().clone();
        self.add_value(predicate, Value::Reference(type_iri))
    }

    pub fn remove_type(&mut self, type_iri: &Iri) -> bool {
        let predicate = self.registry.vocabulary().rdf_type().clone();
        self.remove_value(&predicate, &Value::Reference(type_iri.clone()))
    }

    /// Adds every pair of `other`, re-deriving capabilities once.
    pub fn merge(&mut self, other: &Predicates) -> usize {
        let added = self.predicates.merge(other);
        if added > 0 {
            self.rederive();
        }
        added
    }

    /// Removes every pair of `other`, re-deriving capabilities once.
    pub fn subtract(&mut self, other: &Predicates) -> usize {
        let removed = self.predicates.subtract(other);
        if removed > 0 {
            self.rederive();
        }
        removed
    }

    /// Owned, registry-free copy suitable for persistence.
    #[must_use]
    pub fn to_record(&self) -> EntityRecord {
        EntityRecord {
            id: self.id.clone(),
            predicates: self.predicates.clone(),
        }
    }

    fn rederive(&mut self) {
        let vocabulary = self.registry.vocabulary();
        let resolution = self.registry.resolve(
            self.predicates.references(vocabulary.rdf_type()),
            self.predicates.references(vocabulary.member_of_kind()),
        );
        self.capabilities = resolution.capabilities;
        self.unrecognized = resolution.unrecognized;
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Entity {}

impl PartialOrd for Entity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("predicates", &self.predicates)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Entity", 3)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("predicates", &self.predicates)?;
        state.serialize_field("capabilities", &self.capabilities)?;
        state.end()
    }
}

/// Identifier and predicates of an entity without its derived state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: Iri,
    #[serde(default)]
    pub predicates: Predicates,
}

impl EntityRecord {
    /// Rebuilds the entity against `registry`.
    #[must_use]
    pub fn into_entity(self, registry: Arc<CapabilityRegistry>) -> Entity {
        Entity::with_predicates(self.id, self.predicates, registry)
    }
}
