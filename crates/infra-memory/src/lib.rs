// Nextup Infrastructure - In-Memory Adapter
// Implements: QueueStore, TransactionalQueueStore with optimistic commits

mod queue_store;
mod transaction;

pub use queue_store::InMemoryQueueStore;
pub use transaction::InMemoryQueueTransaction;
