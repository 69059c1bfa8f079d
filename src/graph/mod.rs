//! Transactional graph port.
//!
//! The core never talks to a triple store directly. Change sets are applied
//! through a [`GraphFacade`], which owns the transaction boundary and the
//! persisted predicate sets. [`MemoryGraph`] is the in-process adapter.

pub mod memory;

use std::{fmt, sync::Arc};

pub use memory::MemoryGraph;

use crate::{
    model::{Entity, Iri},
    Result,
};

/// Whether a transaction may write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionMode {
    Read,
    Write,
}

/// Handle of an open transaction, issued by [`GraphFacade::begin_read`] or
/// [`GraphFacade::begin_write`] and passed back to every call made inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Transaction {
    id: u64,
    mode: TransactionMode,
}

impl Transaction {
    #[must_use]
    pub fn read(id: u64) -> Self {
        Self {
            id,
            mode: TransactionMode::Read,
        }
    }

    #[must_use]
    pub fn write(id: u64) -> Self {
        Self {
            id,
            mode: TransactionMode::Write,
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn mode(&self) -> TransactionMode {
        self.mode
    }

    #[must_use]
    pub fn is_write(&self) -> bool {
        self.mode == TransactionMode::Write
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            TransactionMode::Read => "read",
            TransactionMode::Write => "write",
        };
        write!(f, "{mode} transaction #{}", self.id)
    }
}

/// Contract a graph store fulfils for the change machinery.
///
/// At most one write transaction is open at a time. Readers see committed
/// state only; the writer sees its own staged writes.
pub trait GraphFacade: Send + Sync {
    /// Opens a read transaction.
    ///
    /// # Errors
    ///
    /// Implementations report store failures as [`crate::Error::TransactionFailure`].
    fn begin_read(&self) -> Result<Transaction>;

    /// Opens the write transaction.
    ///
    /// # Errors
    ///
    /// Fails when another write transaction is already open.
    fn begin_write(&self) -> Result<Transaction>;

    /// Ends `transaction`, publishing its writes. Committing a transaction
    /// that is no longer open is a no-op.
    ///
    /// # Errors
    ///
    /// A failed commit leaves none of the transaction's writes visible.
    fn commit(&self, transaction: Transaction) -> Result<()>;

    /// Ends `transaction`, discarding its writes. Aborting a transaction
    /// that is no longer open is a no-op.
    ///
    /// # Errors
    ///
    /// Implementations report store failures as [`crate::Error::TransactionFailure`].
    fn abort(&self, transaction: Transaction) -> Result<()>;

    /// Entity stored under `id` as `transaction` sees it, or `None` when
    /// absent or fully deleted.
    ///
    /// # Errors
    ///
    /// Fails when `transaction` is not open.
    fn get(&self, transaction: Transaction, id: &Iri) -> Result<Option<Entity>>;

    /// Writes every predicate value of a new entity.
    ///
    /// # Errors
    ///
    /// Fails unless `transaction` is the open write transaction, or when
    /// `id` is already stored.
    fn create(&self, transaction: Transaction, entity: &Entity) -> Result<()>;

    /// Replaces the stored predicate set of an existing entity.
    ///
    /// # Errors
    ///
    /// Fails unless `transaction` is the open write transaction, or when
    /// `id` is not stored.
    fn update(&self, transaction: Transaction, entity: &Entity) -> Result<()>;

    /// Removes exactly the predicate values carried by `entity`, leaving any
    /// other values stored under the same identifier in place.
    ///
    /// # Errors
    ///
    /// Fails unless `transaction` is the open write transaction.
    fn delete(&self, transaction: Transaction, entity: &Entity) -> Result<()>;
}

impl<T> GraphFacade for Arc<T>
where
    T: GraphFacade + ?Sized,
{
    fn begin_read(&self) -> Result<Transaction> {
        (**self).begin_read()
    }

    fn begin_write(&self) -> Result<Transaction> {
        (**self).begin_write()
    }

    fn commit(&self, transaction: Transaction) -> Result<()> {
        (**self).commit(transaction)
    }

    fn abort(&self, transaction: Transaction) -> Result<()> {
        (**self).abort(transaction)
    }

    fn get(&self, transaction: Transaction, id: &Iri) -> Result<Option<Entity>> {
        (**self).get(transaction, id)
    }

    fn create(&self, transaction: Transaction, entity: &Entity) -> Result<()> {
        (**self).create(transaction, entity)
    }

    fn update(&self, transaction: Transaction, entity: &Entity) -> Result<()> {
        (**self).update(transaction, entity)
    }

    fn delete(&self, transaction: Transaction, entity: &Entity) -> Result<()> {
        (**self).delete(transaction, entity)
    }
}
