//! Extension points for types the built-in ontology does not know about.
//!
//! Providers are passed explicitly to [`crate::model::EntityFactory::initialize`];
//! nothing is discovered implicitly.

use std::sync::Arc;

use super::{CapabilityRegistry, Entity, Iri, RegistryBuilder};
use crate::Result;

/// Contributes type → capability mappings and, optionally, a constructor for
/// the types it owns.
pub trait ExtensionProvider: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Adds the provider's types to the registry under construction.
    ///
    /// # Errors
    ///
    /// A failing provider aborts initialization.
    fn register(&self, registry: &mut RegistryBuilder) -> Result<()>;

    /// Constructor for the provider's private types, bound to the finished registry.
    fn constructor(&self, _registry: &Arc<CapabilityRegistry>) -> Option<Arc<dyn EntityConstructor>> {
        None
    }
}

impl<T> ExtensionProvider for Arc<T>
where
    T: ExtensionProvider + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn register(&self, registry: &mut RegistryBuilder) -> Result<()> {
        (**self).register(registry)
    }

    fn constructor(&self, registry: &Arc<CapabilityRegistry>) -> Option<Arc<dyn EntityConstructor>> {
        (**self).constructor(registry)
    }
}

/// Builds entities for local type names.
pub trait EntityConstructor: Send + Sync {
    /// Returns `None` for type names this constructor does not own, so the
    /// factory falls back to the built-in path.
    fn construct(&self, type_name: &str, id: Iri) -> Option<Entity>;
}

impl<F> EntityConstructor for F
where
    F: Fn(&str, Iri) -> Option<Entity> + Send + Sync,
{
    fn construct(&self, type_name: &str, id: Iri) -> Option<Entity> {
        self(type_name, id)
    }
}
