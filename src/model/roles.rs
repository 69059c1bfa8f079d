//! Operations that only make sense for entities exposing a given role.
//!
//! Each function checks capability membership at run time instead of relying
//! on a static type per role.

use std::collections::BTreeSet;

use super::{Capability, Entity, Iri, Value};
use crate::{Error, Result};

/// Fails unless `entity` exposes `capability`.
///
/// # Errors
///
/// Returns [`Error::MissingCapability`].
pub fn require_capability(entity: &Entity, capability: Capability) -> Result<()> {
    if entity.has_capability(capability) {
        Ok(())
    } else {
        Err(Error::MissingCapability {
            entity: entity.id().clone(),
            capability,
        })
    }
}

/// Associations a participant takes part in.
///
/// # Errors
///
/// Returns [`Error::MissingCapability`] unless the entity is a `Participant`.
pub fn participant_in(entity: &Entity) -> Result<BTreeSet<Iri>> {
    require_capability(entity, Capability::Participant)?;
    let predicate = entity.registry().vocabulary().participant_in();
    Ok(entity.predicates().references(predicate).cloned().collect())
}

/// Participants of `association` among `candidates`: every candidate with the
/// `Participant` role whose `participant_in` references the association.
///
/// # Errors
///
/// Returns [`Error::MissingCapability`] unless `association` is an `Association`.
pub fn participants_of<'a, I>(association: &Entity, candidates: I) -> Result<Vec<&'a Entity>>
where
    I: IntoIterator<Item = &'a Entity>,
{
    require_capability(association, Capability::Association)?;
    Ok(candidates
        .into_iter()
        .filter(|candidate| {
            participant_in(candidate).is_ok_and(|associations| associations.contains(association.id()))
        })
        .collect())
}

/// Possible world a spatio-temporal extent belongs to.
///
/// # Errors
///
/// Returns [`Error::MissingCapability`] unless the entity is a `SpatioTemporalExtent`.
pub fn possible_world(entity: &Entity) -> Result<Option<Iri>> {
    require_capability(entity, Capability::SpatioTemporalExtent)?;
    let predicate = entity.registry().vocabulary().part_of_possible_world();
    Ok(entity.predicates().references(predicate).next().cloned())
}

/// Kinds the entity is a member of.
#[must_use]
pub fn kinds(entity: &Entity) -> BTreeSet<Iri> {
    let predicate = entity.registry().vocabulary().member_of_kind();
    entity.predicates().references(predicate).cloned().collect()
}

/// Names recorded through the entity name predicate.
#[must_use]
pub fn names(entity: &Entity) -> BTreeSet<String> {
    let predicate = entity.registry().vocabulary().entity_name();
    entity
        .value(predicate)
        .into_iter()
        .filter_map(|value| match value {
            Value::String(text) => Some(text),
            _ => None,
        })
        .collect()
}
