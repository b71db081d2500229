// Nextup Infrastructure - SQLite Adapter
// Implements: QueueStore, TransactionalQueueStore

mod connection;
mod migration;
mod queue_store;
mod transaction;

pub use connection::{create_pool, is_memory_url};
pub use migration::run_migrations;
pub use queue_store::SqliteQueueStore;
pub use transaction::SqliteQueueTransaction;

// Note: sqlx::Error conversion is handled by wrapping in helper functions
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
