//! # hqdm-rdf
//!
//! HQDM entities stored as RDF predicates. An entity's capabilities (the
//! ontology roles it exposes) are derived from its type predicates at run
//! time, and edits to a graph are grouped into change sets and
//! transformations that can be inverted.
//!
//! ```rust,ignore
//! let service = ModelService::from_config(&Config::default(), &[])?;
//! let factory = service.factory();
//! let alice = factory.create_named(Iri::new("http://example.org/alice")?, "person")?;
//! let mut change = ChangeSet::new([alice], [])?;
//! service.apply(&mut change)?;
//! ```

pub mod changes;
pub mod config;
pub mod errors;
pub mod graph;
pub mod logger;
pub mod model;
pub mod service;

pub use errors::{Error, Result};
