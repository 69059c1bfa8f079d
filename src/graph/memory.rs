use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex, MutexGuard},
};

use tracing::{debug, warn};

use super::{GraphFacade, Transaction, TransactionMode};
use crate::{
    model::{CapabilityRegistry, Entity, Iri, Predicates},
    Error, Result,
};

type Store = BTreeMap<Iri, Predicates>;

#[derive(Debug, Default)]
struct State {
    committed: Store,
    /// The open write transaction and its working copy.
    writer: Option<(u64, Store)>,
    readers: BTreeSet<u64>,
    next_id: u64,
}

impl State {
    fn issue(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn is_writer(&self, transaction: Transaction) -> bool {
        transaction.is_write()
            && self
                .writer
                .as_ref()
                .is_some_and(|(id, _)| *id == transaction.id())
    }

    /// Store as `transaction` sees it: the writer reads its own staged
    /// writes, readers read committed state.
    fn visible(&self, transaction: Transaction) -> Result<&Store> {
        match transaction.mode() {
            TransactionMode::Write => match &self.writer {
                Some((id, staged)) if *id == transaction.id() => Ok(staged),
                _ => Err(not_open(transaction)),
            },
            TransactionMode::Read if self.readers.contains(&transaction.id()) => {
                Ok(&self.committed)
            }
            TransactionMode::Read => Err(not_open(transaction)),
        }
    }

    fn staged_mut(&mut self, transaction: Transaction) -> Result<&mut Store> {
        match &mut self.writer {
            Some((id, staged)) if transaction.is_write() && *id == transaction.id() => Ok(staged),
            _ => Err(not_open(transaction)),
        }
    }
}

fn not_open(transaction: Transaction) -> Error {
    Error::transaction(format!("{transaction} is not open"))
}

/// In-process graph keeping one predicate set per identifier.
///
/// A write transaction works on a snapshot of the committed store; commit
/// swaps the snapshot in, abort drops it. Read transactions always see the
/// committed store. With referential integrity on, a commit that leaves a
/// reference to an identifier absent from the graph is rejected and
/// discarded.
#[derive(Debug)]
pub struct MemoryGraph {
    registry: Arc<CapabilityRegistry>,
    referential_integrity: bool,
    state: Mutex<State>,
}

impl MemoryGraph {
    /// Empty graph rehydrating entities against `registry`, with
    /// referential integrity checking enabled.
    #[must_use]
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            registry,
            referential_integrity: true,
            state: Mutex::new(State::default()),
        }
    }

    #[must_use]
    pub fn with_referential_integrity(mut self, enabled: bool) -> Self {
        self.referential_integrity = enabled;
        self
    }

    /// Committed predicate sets, keyed by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransactionFailure`] if the state lock is poisoned.
    pub fn snapshot(&self) -> Result<BTreeMap<Iri, Predicates>> {
        Ok(self.state()?.committed.clone())
    }

    /// Number of committed entities.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransactionFailure`] if the state lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.state()?.committed.len())
    }

    /// # Errors
    ///
    /// Returns [`Error::TransactionFailure`] if the state lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.state()?.committed.is_empty())
    }

    fn state(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| Error::transaction("graph state lock poisoned"))
    }

    /// References that point at nothing in `store`.
    ///
    /// Type values and identifiers the registry already knows (ontology
    /// types and kinds) are not graph nodes and are never dangling.
    fn dangling(&self, store: &Store) -> BTreeSet<(Iri, Iri)> {
        let vocabulary = self.registry.vocabulary();
        let mut dangling = BTreeSet::new();
        for (id, predicates) in store {
            for (predicate, value) in predicates.pairs() {
                let Some(target) = value.as_reference() else {
                    continue;
                };
                if predicate == vocabulary.rdf_type()
                    || store.contains_key(target)
                    || vocabulary.local_term(target).is_some()
                    || self.registry.capability_of(target).is_some()
                    || self.registry.component_of(target).is_some()
                {
                    continue;
                }
                dangling.insert((id.clone(), target.clone()));
            }
        }
        dangling
    }
}

impl GraphFacade for MemoryGraph {
    fn begin_read(&self) -> Result<Transaction> {
        let mut state = self.state()?;
        let id = state.issue();
        state.readers.insert(id);
        Ok(Transaction::read(id))
    }

    fn begin_write(&self) -> Result<Transaction> {
        let mut state = self.state()?;
        if let Some((open, _)) = &state.writer {
            return Err(Error::transaction(format!(
                "write transaction #{open} is already open"
            )));
        }
        let id = state.issue();
        let staged = state.committed.clone();
        state.writer = Some((id, staged));
        debug!(transaction = id, "write_transaction_opened");
        Ok(Transaction::write(id))
    }

    fn commit(&self, transaction: Transaction) -> Result<()> {
        let mut state = self.state()?;
        if !transaction.is_write() {
            state.readers.remove(&transaction.id());
            return Ok(());
        }
        if !state.is_writer(transaction) {
            debug!(transaction = transaction.id(), "commit_of_closed_transaction");
            return Ok(());
        }
        let Some((_, staged)) = state.writer.take() else {
            return Ok(());
        };

        if self.referential_integrity {
            let dangling = self.dangling(&staged);
            if let Some((source, target)) = dangling.first() {
                warn!(
                    transaction = transaction.id(),
                    entity.id = %source,
                    target = %target,
                    dangling = dangling.len(),
                    "commit_rejected"
                );
                return Err(Error::transaction(format!(
                    "`{source}` references `{target}`, which is not in the graph"
                )));
            }
        }

        debug!(
            transaction = transaction.id(),
            entities = staged.len(),
            "write_transaction_committed"
        );
        state.committed = staged;
        Ok(())
    }

    fn abort(&self, transaction: Transaction) -> Result<()> {
        let mut state = self.state()?;
        if !transaction.is_write() {
            state.readers.remove(&transaction.id());
        } else if state.is_writer(transaction) {
            state.writer = None;
            debug!(transaction = transaction.id(), "write_transaction_aborted");
        }
        Ok(())
    }

    fn get(&self, transaction: Transaction, id: &Iri) -> Result<Option<Entity>> {
        let state = self.state()?;
        Ok(state.visible(transaction)?.get(id).map(|predicates| {
            Entity::with_predicates(id.clone(), predicates.clone(), Arc::clone(&self.registry))
        }))
    }

    fn create(&self, transaction: Transaction, entity: &Entity) -> Result<()> {
        let mut state = self.state()?;
        let staged = state.staged_mut(transaction)?;
        if staged.contains_key(entity.id()) {
            return Err(Error::transaction(format!(
                "`{}` already exists",
                entity.id()
            )));
        }
        if !entity.predicates().is_empty() {
            staged.insert(entity.id().clone(), entity.predicates().clone());
        }
        Ok(())
    }

    fn update(&self, transaction: Transaction, entity: &Entity) -> Result<()> {
        let mut state = self.state()?;
        let staged = state.staged_mut(transaction)?;
        if !staged.contains_key(entity.id()) {
            return Err(Error::transaction(format!(
                "`{}` does not exist",
                entity.id()
            )));
        }
        if entity.predicates().is_empty() {
            staged.remove(entity.id());
        } else {
            staged.insert(entity.id().clone(), entity.predicates().clone());
        }
        Ok(())
    }

    fn delete(&self, transaction: Transaction, entity: &Entity) -> Result<()> {
        let mut state = self.state()?;
        let staged = state.staged_mut(transaction)?;
        if let Some(stored) = staged.get_mut(entity.id()) {
            stored.subtract(entity.predicates());
            if stored.is_empty() {
                staged.remove(entity.id());
            }
        }
        Ok(())
    }
}
