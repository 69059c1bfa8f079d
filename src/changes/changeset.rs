use std::{collections::BTreeMap, fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    graph::{GraphFacade, Transaction},
    model::{Entity, EntityFactory, EntityRecord, Iri, Predicates},
    Error, Result,
};

/// Lifecycle of a [`ChangeSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeSetState {
    Built,
    Applying,
    Applied,
    Failed,
}

impl fmt::Display for ChangeSetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Built => "built",
            Self::Applying => "applying",
            Self::Applied => "applied",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Atomic edit of a graph: entities whose predicate values are written and
/// entities whose recorded predicate values are removed.
///
/// A change set is applied once, inside one write transaction. Once applied
/// it can be inverted into the change set that undoes it.
#[derive(Clone, Debug)]
pub struct ChangeSet {
    creates: BTreeMap<Iri, Entity>,
    deletes: BTreeMap<Iri, Entity>,
    state: ChangeSetState,
}

impl ChangeSet {
    /// Groups creates and deletes. Entities sharing an identifier on the
    /// same side are merged into one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChangeSet`] when an identifier is both
    /// created and deleted.
    pub fn new<C, D>(creates: C, deletes: D) -> Result<Self>
    where
        C: IntoIterator<Item = Entity>,
        D: IntoIterator<Item = Entity>,
    {
        let creates = collect(creates);
        let deletes = collect(deletes);
        if let Some(id) = creates.keys().find(|id| deletes.contains_key(*id)) {
            return Err(Error::InvalidChangeSet { entity: id.clone() });
        }
        Ok(Self {
            creates,
            deletes,
            state: ChangeSetState::Built,
        })
    }

    /// Change set that only writes.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn creating<C>(creates: C) -> Result<Self>
    where
        C: IntoIterator<Item = Entity>,
    {
        Self::new(creates, Vec::new())
    }

    /// Change set that only removes.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn deleting<D>(deletes: D) -> Result<Self>
    where
        D: IntoIterator<Item = Entity>,
    {
        Self::new(Vec::new(), deletes)
    }

    pub fn creates(&self) -> impl Iterator<Item = &Entity> {
        self.creates.values()
    }

    pub fn deletes(&self) -> impl Iterator<Item = &Entity> {
        self.deletes.values()
    }

    #[must_use]
    pub fn state(&self) -> ChangeSetState {
        self.state
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.deletes.is_empty()
    }

    /// Applies the change set inside one write transaction of `graph`.
    ///
    /// Creates are written first, merging into entities that already exist;
    /// then each delete removes exactly the values it records. Nothing is
    /// visible unless the whole set commits.
    ///
    /// Once applied, the change set holds only what it actually changed:
    /// creates narrow to the pairs that were not stored yet, deletes to the
    /// pairs that were. Entities left with no pairs are dropped, so
    /// [`Self::invert`] undoes exactly this application.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] unless the change set is
    /// [`ChangeSetState::Built`], and [`Error::TransactionFailure`] when the
    /// graph rejects a write or the commit. A failed change set stays
    /// [`ChangeSetState::Failed`].
    pub fn apply<G>(&mut self, graph: &G) -> Result<()>
    where
        G: GraphFacade + ?Sized,
    {
        self.expect_state(ChangeSetState::Built)?;
        self.state = ChangeSetState::Applying;

        let transaction = match graph.begin_write() {
            Ok(transaction) => transaction,
            Err(err) => {
                self.state = ChangeSetState::Failed;
                warn!(err = %err, "change_set_not_started");
                return Err(as_transaction_failure(err));
            }
        };

        let written = self
            .write(graph, transaction)
            .and_then(|effect| graph.commit(transaction).map(|()| effect));
        match written {
            Ok((creates, deletes)) => {
                self.creates = creates;
                self.deletes = deletes;
                self.state = ChangeSetState::Applied;
                info!(
                    transaction = transaction.id(),
                    creates = self.creates.len(),
                    deletes = self.deletes.len(),
                    "change_set_applied"
                );
                Ok(())
            }
            Err(err) => {
                if let Err(abort) = graph.abort(transaction) {
                    warn!(err = %abort, "abort_failed");
                }
                self.state = ChangeSetState::Failed;
                warn!(transaction = transaction.id(), err = %err, "change_set_failed");
                Err(as_transaction_failure(err))
            }
        }
    }

    /// Change set undoing this one: creates and deletes swapped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] unless the change set is
    /// [`ChangeSetState::Applied`].
    pub fn invert(&self) -> Result<Self> {
        self.expect_state(ChangeSetState::Applied)?;
        Ok(Self {
            creates: self.deletes.clone(),
            deletes: self.creates.clone(),
            state: ChangeSetState::Built,
        })
    }

    #[must_use]
    pub fn to_record(&self) -> ChangeSetRecord {
        ChangeSetRecord {
            state: self.state,
            creates: self.creates().map(Entity::to_record).collect(),
            deletes: self.deletes().map(Entity::to_record).collect(),
        }
    }

    /// Rebuilds a recorded change set, lifecycle state included, against
    /// the factory's registry.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn from_record(record: ChangeSetRecord, factory: &EntityFactory) -> Result<Self> {
        let mut change = Self::new(
            record.creates.into_iter().map(|entity| factory.rehydrate(entity)),
            record.deletes.into_iter().map(|entity| factory.rehydrate(entity)),
        )?;
        change.state = record.state;
        Ok(change)
    }

    /// Writes the change set and returns what it actually changed.
    fn write<G>(&self, graph: &G, transaction: Transaction) -> Result<(Changes, Changes)>
    where
        G: GraphFacade + ?Sized,
    {
        let mut created = Changes::new();
        for entity in self.creates.values() {
            let added = match graph.get(transaction, entity.id())? {
                Some(mut existing) => {
                    let added = entity.predicates().difference(existing.predicates());
                    if !added.is_empty() {
                        existing.merge(&added);
                        graph.update(transaction, &existing)?;
                    }
                    added
                }
                None => {
                    graph.create(transaction, entity)?;
                    entity.predicates().clone()
                }
            };
            keep(&mut created, entity, added);
        }

        let mut deleted = Changes::new();
        for entity in self.deletes.values() {
            let Some(existing) = graph.get(transaction, entity.id())? else {
                continue;
            };
            let present = entity.predicates().intersection(existing.predicates());
            if !present.is_empty() {
                graph.delete(transaction, entity)?;
            }
            keep(&mut deleted, entity, present);
        }
        Ok((created, deleted))
    }

    fn expect_state(&self, expected: ChangeSetState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::InvalidState {
                expected,
                found: self.state,
            })
        }
    }
}

/// Serializable form of a [`ChangeSet`], suitable for an edit log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSetRecord {
    pub state: ChangeSetState,
    #[serde(default)]
    pub creates: Vec<EntityRecord>,
    #[serde(default)]
    pub deletes: Vec<EntityRecord>,
}

type Changes = BTreeMap<Iri, Entity>;

fn keep(changes: &mut Changes, entity: &Entity, predicates: Predicates) {
    if !predicates.is_empty() {
        changes.insert(
            entity.id().clone(),
            Entity::with_predicates(entity.id().clone(), predicates, Arc::clone(entity.registry())),
        );
    }
}

fn collect<I>(entities: I) -> BTreeMap<Iri, Entity>
where
    I: IntoIterator<Item = Entity>,
{
    let mut collected: BTreeMap<Iri, Entity> = BTreeMap::new();
    for entity in entities {
        match collected.get_mut(entity.id()) {
            Some(existing) => {
                existing.merge(entity.predicates());
            }
            None => {
                collected.insert(entity.id().clone(), entity);
            }
        }
    }
    collected
}

fn as_transaction_failure(err: Error) -> Error {
    match err {
        Error::TransactionFailure { .. } => err,
        other => Error::transaction(other.to_string()),
    }
}
