// Transaction port for atomic read-modify-write

use crate::domain::{ListKind, OrderedEntry, ParticipantId, SequenceKey};
use crate::error::Result;
use async_trait::async_trait;

/// Transaction trait for atomic multi-step operations
///
/// Adapters report a lost race as `AppError::Conflict`, either from an
/// individual call or from `commit`. Dropping a transaction without
/// committing discards its writes.
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Transactional access to the shared ordered store
#[async_trait]
pub trait TransactionalQueueStore: Send + Sync {
    /// Begin a new transaction
    async fn begin_transaction(&self) -> Result<Box<dyn QueueStoreTransaction>>;
}

/// Store operations within a transaction
#[async_trait]
pub trait QueueStoreTransaction: Transaction {
    /// All entries of a list, ascending by sequence key
    async fn entries(&mut self, queue: &str, list: ListKind) -> Result<Vec<OrderedEntry>>;

    /// Minimum-key entry of a list
    async fn first_entry(&mut self, queue: &str, list: ListKind) -> Result<Option<OrderedEntry>>;

    /// Highest key currently in a list
    async fn max_sequence_key(&mut self, queue: &str, list: ListKind)
        -> Result<Option<SequenceKey>>;

    /// Highest key ever inserted into a list since it was last cleared.
    ///
    /// Unlike `max_sequence_key` this does not drop when entries are
    /// removed, so a drained list never hands out a used key again.
    async fn high_water_key(&mut self, queue: &str, list: ListKind)
        -> Result<Option<SequenceKey>>;

    /// Is this participant in either list
    async fn contains_participant(&mut self, queue: &str, id: &ParticipantId) -> Result<bool>;

    /// Insert an entry under its sequence key, raising the high-water key
    async fn insert(&mut self, queue: &str, list: ListKind, entry: &OrderedEntry) -> Result<()>;

    /// Remove the entry with this key, returns whether one existed
    async fn remove(&mut self, queue: &str, list: ListKind, key: SequenceKey) -> Result<bool>;

    /// Remove every entry of a list and forget its high-water key,
    /// returns how many entries were removed
    async fn clear(&mut self, queue: &str, list: ListKind) -> Result<u64>;
}
