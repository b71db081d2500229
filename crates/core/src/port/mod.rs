// Port Layer - Interfaces for external dependencies

pub mod identity_provider;
pub mod queue_store;
pub mod time_provider; // For deterministic testing
pub mod transaction;

// Re-exports
pub use identity_provider::{AnonymousIdentityProvider, IdentityProvider, StaticIdentityProvider};
pub use queue_store::QueueStore;
pub use time_provider::TimeProvider;
pub use transaction::{QueueStoreTransaction, Transaction, TransactionalQueueStore};
