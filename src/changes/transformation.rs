use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{ChangeSet, ChangeSetRecord, ChangeSetState};
use crate::{graph::GraphFacade, model::EntityFactory, Error, Result};

/// Ordered sequence of change sets, each applied in its own transaction.
#[derive(Clone, Debug, Default)]
pub struct Transformation {
    steps: Vec<ChangeSet>,
}

impl Transformation {
    #[must_use]
    pub fn new<I>(steps: I) -> Self
    where
        I: IntoIterator<Item = ChangeSet>,
    {
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    pub fn push(&mut self, step: ChangeSet) -> &mut Self {
        self.steps.push(step);
        self
    }

    #[must_use]
    pub fn steps(&self) -> &[ChangeSet] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of leading steps that are applied.
    #[must_use]
    pub fn applied_steps(&self) -> usize {
        self.steps
            .iter()
            .take_while(|step| step.state() == ChangeSetState::Applied)
            .count()
    }

    /// Applies every step in order, stopping at the first failure.
    ///
    /// Steps applied before the failing one stay committed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransformationStep`] carrying the failing step's
    /// index and its error.
    pub fn apply<G>(&mut self, graph: &G) -> Result<()>
    where
        G: GraphFacade + ?Sized,
    {
        for (index, step) in self.steps.iter_mut().enumerate() {
            if let Err(source) = step.apply(graph) {
                warn!(step = index, err = %source, "transformation_step_failed");
                return Err(Error::TransformationStep {
                    step: index,
                    source: Box::new(source),
                });
            }
        }
        info!(steps = self.steps.len(), "transformation_applied");
        Ok(())
    }

    /// Transformation undoing this one: every step inverted, last step first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] unless every step is applied.
    pub fn invert(&self) -> Result<Self> {
        let steps = self
            .steps
            .iter()
            .rev()
            .map(ChangeSet::invert)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { steps })
    }

    /// Inverse of the applied prefix only, for undoing a transformation that
    /// stopped part way.
    ///
    /// # Errors
    ///
    /// See [`Self::invert`].
    pub fn invert_applied(&self) -> Result<Self> {
        let steps = self.steps[..self.applied_steps()]
            .iter()
            .rev()
            .map(ChangeSet::invert)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { steps })
    }

    #[must_use]
    pub fn to_record(&self) -> TransformationRecord {
        TransformationRecord {
            steps: self.steps.iter().map(ChangeSet::to_record).collect(),
        }
    }

    /// # Errors
    ///
    /// See [`ChangeSet::from_record`].
    pub fn from_record(record: TransformationRecord, factory: &EntityFactory) -> Result<Self> {
        let steps = record
            .steps
            .into_iter()
            .map(|step| ChangeSet::from_record(step, factory))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { steps })
    }
}

impl FromIterator<ChangeSet> for Transformation {
    fn from_iter<I: IntoIterator<Item = ChangeSet>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Serializable form of a [`Transformation`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformationRecord {
    pub steps: Vec<ChangeSetRecord>,
}
