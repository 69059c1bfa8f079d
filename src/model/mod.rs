//! HQDM entity model.
//!
//! Value objects, the capability lattice and its registry, entities with their
//! predicate store, and the factory that turns type identifiers into entities.
//! Nothing in here touches a graph; persistence lives behind
//! [`crate::graph::GraphFacade`].

pub mod capability;
pub mod entities;
pub mod export;
pub mod extension;
pub mod factory;
pub mod predicates;
pub mod registry;
pub mod roles;
pub mod value_objects;
pub mod vocabulary;

pub use capability::Capability;
pub use entities::{Entity, EntityRecord};
pub use extension::{EntityConstructor, ExtensionProvider};
pub use factory::{EntityBuilder, EntityFactory};
pub use predicates::Predicates;
pub use registry::{CapabilityRegistry, RegistryBuilder, Resolution};
pub use value_objects::{Iri, Value};
pub use vocabulary::Vocabulary;
