//! # Error Handling
//!
//! Every fallible operation in the crate reports an [`Error`]. Construction
//! errors (identifiers, types, capabilities) are raised before any store is
//! touched, while [`Error::TransactionFailure`] is only produced once a
//! transaction boundary has been crossed.

use crate::changes::ChangeSetState;
use crate::model::{Capability, Iri};

/// Unified error type for the crate.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    /// An identifier string failed to parse as an IRI.
    #[error("malformed identifier: `{value}`")]
    MalformedIdentifier { value: String },

    /// None of the supplied types maps to a known capability.
    #[error("none of the types [{}] resolves to a capability", format_iris(.types))]
    UnresolvableType { types: Vec<Iri> },

    /// The requested capability is disjoint with what the entity already exposes.
    #[error("entity `{entity}` cannot expose {requested}: conflicts with {existing}")]
    CapabilityConflict {
        entity: Iri,
        requested: Capability,
        existing: Capability,
    },

    #[error("entity `{entity}` does not expose {capability}")]
    MissingCapability {
        entity: Iri,
        capability: Capability,
    },

    /// A capability that has no type registered for it.
    #[error("capability {capability} is not registered")]
    UnknownCapability { capability: Capability },

    /// The graph reported a write or commit failure.
    #[error("transaction failed: {reason}")]
    TransactionFailure { reason: String },

    /// The same identifier appears in both the creates and the deletes of a change set.
    #[error("entity `{entity}` is both created and deleted in one change set")]
    InvalidChangeSet { entity: Iri },

    #[error("change set is {found}, expected {expected}")]
    InvalidState {
        expected: ChangeSetState,
        found: ChangeSetState,
    },

    /// A transformation step failed; earlier steps stay committed.
    #[error("transformation step {step} failed: {source}")]
    TransformationStep {
        step: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("extension provider `{provider}` failed: {reason}")]
    Extension { provider: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    YAML(#[from] serde_yaml::Error),

    #[error(transparent)]
    JSON(#[from] serde_json::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn transaction(reason: impl Into<String>) -> Self {
        Self::TransactionFailure {
            reason: reason.into(),
        }
    }

    /// Index of the failing step when the error came out of a transformation.
    #[must_use]
    pub fn failed_step(&self) -> Option<usize> {
        match self {
            Self::TransformationStep { step, .. } => Some(*step),
            _ => None,
        }
    }
}

fn format_iris(iris: &[Iri]) -> String {
    iris.iter()
        .map(Iri::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
