//! IRIs of the upper ontology and of RDF itself.
//!
//! A [`Vocabulary`] is built once at start-up and shared by reference. The
//! HQDM namespace is configurable so graphs written against a mirrored copy
//! of the ontology can still be read.

use crate::{model::Iri, Result};

/// Default namespace of the HQDM upper ontology.
pub const HQDM_NAMESPACE: &str = "https://hqdmtop.github.io/hqdm#";
/// The RDF `type` predicate.
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
/// XML Schema namespace used for typed literals.
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";

/// Immutable catalog of the predicate IRIs the model relies on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vocabulary {
    namespace: String,
    rdf_type: Iri,
    member_of: Iri,
    member_of_kind: Iri,
    participant_in: Iri,
    part_of_possible_world: Iri,
    temporal_part_of: Iri,
    entity_name: Iri,
    value: Iri,
}

impl Vocabulary {
    /// Builds the catalog for an HQDM namespace and an RDF type predicate.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedIdentifier`] if either argument does
    /// not produce valid IRIs.
    pub fn new(namespace: impl Into<String>, rdf_type: &str) -> Result<Self> {
        let namespace = namespace.into();
        let term = |name: &str| Iri::new(format!("{namespace}{name}"));
        Ok(Self {
            rdf_type: Iri::new(rdf_type)?,
            member_of: term("member_of")?,
            member_of_kind: term("member_of_kind")?,
            participant_in: term("participant_in")?,
            part_of_possible_world: term("part_of_possible_world")?,
            temporal_part_of: term("temporal_part_of")?,
            entity_name: term("data_EntityName")?,
            value: term("value_")?,
            namespace,
        })
    }

    /// Catalog for the published HQDM namespace.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in constants; the `Result` mirrors [`Self::new`].
    pub fn hqdm() -> Result<Self> {
        Self::new(HQDM_NAMESPACE, RDF_TYPE)
    }

    /// Resolves an ontology term, e.g. `person`, to its IRI.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedIdentifier`] when `local_name` cannot
    /// be appended to the namespace.
    pub fn term(&self, local_name: &str) -> Result<Iri> {
        Iri::new(format!("{}{local_name}", self.namespace))
    }

    /// Returns the local name of `iri` if it lives in this namespace.
    #[must_use]
    pub fn local_term<'a>(&self, iri: &'a Iri) -> Option<&'a str> {
        iri.as_str().strip_prefix(self.namespace.as_str())
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn rdf_type(&self) -> &Iri {
        &self.rdf_type
    }

    #[must_use]
    pub fn member_of(&self) -> &Iri {
        &self.member_of
    }

    #[must_use]
    pub fn member_of_kind(&self) -> &Iri {
        &self.member_of_kind
    }

    #[must_use]
    pub fn participant_in(&self) -> &Iri {
        &self.participant_in
    }

    #[must_use]
    pub fn part_of_possible_world(&self) -> &Iri {
        &self.part_of_possible_world
    }

    #[must_use]
    pub fn temporal_part_of(&self) -> &Iri {
        &self.temporal_part_of
    }

    #[must_use]
    pub fn entity_name(&self) -> &Iri {
        &self.entity_name
    }

    #[must_use]
    pub fn value(&self) -> &Iri {
        &self.value
    }

    /// Whether mutations of `predicate` change the capability set of an entity.
    #[must_use]
    pub fn is_capability_bearing(&self, predicate: &Iri) -> bool {
        predicate == &self.rdf_type || predicate == &self.member_of_kind
    }
}
