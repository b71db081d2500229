// Queue Store Port (Interface)

use crate::domain::{ListKind, OrderedEntry};
use crate::error::Result;
use crate::port::TransactionalQueueStore;
use async_trait::async_trait;

/// Shared ordered store backing every queue.
///
/// Reads here see one list at a time. Anything that must observe both
/// lists consistently goes through `begin_transaction`.
#[async_trait]
pub trait QueueStore: TransactionalQueueStore {
    /// All entries of a list, ascending by sequence key
    async fn entries(&self, queue: &str, list: ListKind) -> Result<Vec<OrderedEntry>>;

    /// Number of entries in a list
    async fn count(&self, queue: &str, list: ListKind) -> Result<u64>;
}
