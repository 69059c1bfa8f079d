//! Invertible edits to a graph.
//!
//! A [`ChangeSet`] is applied atomically through a
//! [`crate::graph::GraphFacade`]; a [`Transformation`] applies several of them
//! in order. Both can be turned into the edit that undoes them once applied.

pub mod changeset;
pub mod transformation;

pub use changeset::{ChangeSet, ChangeSetRecord, ChangeSetState};
pub use transformation::{Transformation, TransformationRecord};
