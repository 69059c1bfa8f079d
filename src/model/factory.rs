use std::sync::Arc;

use heck::ToSnakeCase;
use tracing::{debug, info};

use super::{
    Capability, CapabilityRegistry, Entity, EntityConstructor, EntityRecord, ExtensionProvider,
    Iri, Predicates, RegistryBuilder, Value,
};
use crate::{Error, Result};

/// Produces entities whose capability set matches their type predicates.
#[derive(Clone)]
pub struct EntityFactory {
    registry: Arc<CapabilityRegistry>,
    constructors: Vec<Arc<dyn EntityConstructor>>,
}

impl EntityFactory {
    /// Creates a factory over an already built registry, without extension constructors.
    #[must_use]
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            registry,
            constructors: Vec::new(),
        }
    }

    /// Runs every provider against `builder`, freezes the registry and
    /// collects the providers' constructors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Extension`] naming the first provider that fails to register.
    pub fn initialize(
        mut builder: RegistryBuilder,
        providers: &[Arc<dyn ExtensionProvider>],
    ) -> Result<Self> {
        for provider in providers {
            provider
                .register(&mut builder)
                .map_err(|err| Error::Extension {
                    provider: provider.name().to_string(),
                    reason: err.to_string(),
                })?;
            info!(provider = provider.name(), "extension_registered");
        }

        let registry = builder.build();
        let constructors = providers
            .iter()
            .filter_map(|provider| provider.constructor(&registry))
            .collect();

        Ok(Self {
            registry,
            constructors,
        })
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    /// Creates an entity typed with every identifier in `types`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvableType`] when no type resolves to a
    /// capability and no extension constructor claims any of them.
    pub fn create<I>(&self, id: Iri, types: I) -> Result<Entity>
    where
        I: IntoIterator<Item = Iri>,
    {
        let types: Vec<Iri> = types.into_iter().collect();
        let predicates = self.type_predicates(&types);
        let entity = Entity::with_predicates(id, predicates, Arc::clone(&self.registry));

        if !entity.capabilities().is_empty() {
            debug!(entity.id = %entity.id(), capabilities = entity.capabilities().len(), "entity_created");
            return Ok(entity);
        }

        for type_iri in &types {
            if let Some(mut claimed) = self.construct(type_iri.local_name(), entity.id()) {
                claimed.merge(entity.predicates());
                debug!(entity.id = %claimed.id(), type_iri = %type_iri, "entity_claimed_by_extension");
                return Ok(claimed);
            }
        }

        Err(Error::UnresolvableType { types })
    }

    /// Creates an entity from a local type name such as `Person` or
    /// `kind_of_person`. Extension constructors are asked first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvableType`] when neither an extension nor the
    /// built-in ontology knows `type_name`.
    pub fn create_named(&self, id: Iri, type_name: &str) -> Result<Entity> {
        if let Some(entity) = self.construct(type_name, &id) {
            return Ok(entity);
        }
        let type_iri = self
            .registry
            .vocabulary()
            .term(&type_name.to_snake_case())?;
        self.create(id, [type_iri])
    }

    /// Returns a copy of `entity` that also exposes `required`, keeping every
    /// stored predicate value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityConflict`] when `required` is disjoint with
    /// a capability the entity already has, and [`Error::UnknownCapability`]
    /// when no type is registered for `required`.
    pub fn upgrade(&self, entity: &Entity, required: Capability) -> Result<Entity> {
        let mut upgraded = Entity::with_predicates(
            entity.id().clone(),
            entity.predicates().clone(),
            Arc::clone(&self.registry),
        );
        if upgraded.has_capability(required) {
            return Ok(upgraded);
        }

        if let Some(existing) = self
            .registry
            .conflict_with(upgraded.capabilities(), required)
        {
            return Err(Error::CapabilityConflict {
                entity: entity.id().clone(),
                requested: required,
                existing,
            });
        }

        let type_iri = self
            .registry
            .type_iri(required)
            .ok_or(Error::UnknownCapability {
                capability: required,
            })?;
        upgraded.add_type(type_iri.clone());
        debug!(entity.id = %upgraded.id(), capability = %required, "entity_upgraded");
        Ok(upgraded)
    }

    /// Rebuilds a persisted entity against this factory's registry.
    #[must_use]
    pub fn rehydrate(&self, record: EntityRecord) -> Entity {
        record.into_entity(Arc::clone(&self.registry))
    }

    /// Starts a fluent builder for an entity with identifier `id`.
    #[must_use]
    pub fn builder(&self, id: Iri) -> EntityBuilder<'_> {
        EntityBuilder {
            factory: self,
            id,
            types: Vec::new(),
            predicates: Predicates::new(),
        }
    }

    fn construct(&self, type_name: &str, id: &Iri) -> Option<Entity> {
        self.constructors
            .iter()
            .find_map(|constructor| constructor.construct(type_name, id.clone()))
    }

    fn type_predicates(&self, types: &[Iri]) -> Predicates {
        let rdf_type = self.registry.vocabulary().rdf_type();
        types
            .iter()
            .map(|type_iri| (rdf_type.clone(), Value::Reference(type_iri.clone())))
            .collect()
    }
}

/// Collects types and predicate values, then creates the entity through the factory.
pub struct EntityBuilder<'a> {
    factory: &'a EntityFactory,
    id: Iri,
    types: Vec<Iri>,
    predicates: Predicates,
}

impl EntityBuilder<'_> {
    #[must_use]
    pub fn with_type(mut self, type_iri: Iri) -> Self {
        self.types.push(type_iri);
        self
    }

    #[must_use]
    pub fn with_value(mut self, predicate: Iri, value: impl Into<Value>) -> Self {
        self.predicates.add_value(predicate, value.into());
        self
    }

    #[must_use]
    pub fn with_reference(self, predicate: Iri, target: &Iri) -> Self {
        self.with_value(predicate, Value::Reference(target.clone()))
    }

    #[must_use]
    pub fn with_string(self, predicate: Iri, text: impl Into<String>) -> Self {
        self.with_value(predicate, Value::String(text.into()))
    }

    /// Adds `member_of` → `class`.
    #[must_use]
    pub fn member_of(self, class: &Iri) -> Self {
        let predicate = self.factory.registry.vocabulary().member_of().clone();
        self.with_reference(predicate, class)
    }

    /// Adds `member_of_kind` → `kind`.
    #[must_use]
    pub fn member_of_kind(self, kind: &Iri) -> Self {
        let predicate = self.factory.registry.vocabulary().member_of_kind().clone();
        self.with_reference(predicate, kind)
    }

    /// Adds `participant_in` → `association`.
    #[must_use]
    pub fn participant_in(self, association: &Iri) -> Self {
        let predicate = self.factory.registry.vocabulary().participant_in().clone();
        self.with_reference(predicate, association)
    }

    /// Creates the entity.
    ///
    /// # Errors
    ///
    /// See [`EntityFactory::create`].
    pub fn build(self) -> Result<Entity> {
        let mut entity = self.factory.create(self.id, self.types)?;
        entity.merge(&self.predicates);
        Ok(entity)
    }
}
