use std::sync::Arc;

use tracing::info;

use crate::{
    changes::{ChangeSet, Transformation},
    config::Config,
    graph::{GraphFacade, MemoryGraph},
    model::{
        export, CapabilityRegistry, Entity, EntityFactory, ExtensionProvider, Iri, Vocabulary,
    },
    Result,
};

/// Entity factory and graph wired together.
///
/// Every graph access goes through its own transaction, so the service can be
/// shared across threads as long as the graph can.
pub struct ModelService<G = MemoryGraph> {
    factory: EntityFactory,
    graph: G,
}

impl ModelService<MemoryGraph> {
    /// Builds the registry from the configured ontology and `providers`,
    /// then an in-memory graph over it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedIdentifier`] for namespace or kind
    /// identifiers that are not IRIs, and [`crate::Error::Extension`] when a
    /// provider fails to register.
    pub fn from_config(config: &Config, providers: &[Arc<dyn ExtensionProvider>]) -> Result<Self> {
        let ontology = &config.ontology;
        let vocabulary = Vocabulary::new(ontology.namespace.as_str(), &ontology.rdf_type)?;
        let mut builder = CapabilityRegistry::builder(vocabulary)?;
        for declaration in &ontology.kinds {
            builder.register_kind(
                Iri::new(declaration.kind.as_str())?,
                Iri::new(declaration.component.as_str())?,
            );
        }

        let factory = EntityFactory::initialize(builder, providers)?;
        let graph = MemoryGraph::new(Arc::clone(factory.registry()))
            .with_referential_integrity(config.graph.referential_integrity);
        info!(
            namespace = %ontology.namespace,
            types = factory.registry().len(),
            providers = providers.len(),
            "model_service_ready"
        );
        Ok(Self::new(factory, graph))
    }
}

impl<G> ModelService<G>
where
    G: GraphFacade,
{
    #[must_use]
    pub fn new(factory: EntityFactory, graph: G) -> Self {
        Self { factory, graph }
    }

    #[must_use]
    pub fn factory(&self) -> &EntityFactory {
        &self.factory
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        self.factory.registry()
    }

    #[must_use]
    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// Reads one committed entity inside its own read transaction.
    ///
    /// # Errors
    ///
    /// Propagates graph failures.
    pub fn get(&self, id: &Iri) -> Result<Option<Entity>> {
        let transaction = self.graph.begin_read()?;
        let entity = self.graph.get(transaction, id);
        self.graph.commit(transaction)?;
        entity
    }

    /// Turtle block of the stored entity, if any.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub fn describe(&self, id: &Iri) -> Result<Option<String>> {
        Ok(self.get(id)?.map(|entity| export::to_triples(&entity)))
    }

    /// # Errors
    ///
    /// See [`ChangeSet::apply`].
    pub fn apply(&self, change: &mut ChangeSet) -> Result<()> {
        change.apply(&self.graph)
    }

    /// # Errors
    ///
    /// See [`Transformation::apply`].
    pub fn apply_transformation(&self, transformation: &mut Transformation) -> Result<()> {
        transformation.apply(&self.graph)
    }

    /// Inverts an applied change set and applies the inverse, returning it.
    ///
    /// # Errors
    ///
    /// See [`ChangeSet::invert`] and [`ChangeSet::apply`].
    pub fn undo(&self, change: &ChangeSet) -> Result<ChangeSet> {
        let mut inverse = change.invert()?;
        inverse.apply(&self.graph)?;
        Ok(inverse)
    }

    /// Undoes the applied prefix of a transformation, last step first.
    ///
    /// # Errors
    ///
    /// See [`Transformation::invert_applied`] and [`Transformation::apply`].
    pub fn undo_transformation(&self, transformation: &Transformation) -> Result<Transformation> {
        let mut inverse = transformation.invert_applied()?;
        inverse.apply(&self.graph)?;
        Ok(inverse)
    }
}
