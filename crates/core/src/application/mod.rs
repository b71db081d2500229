// Application Layer - Use Cases and Business Logic

pub mod constants;
pub mod retry;
pub mod turn_queue;
pub mod view;

// Re-exports
pub use retry::ConflictRetryPolicy;
pub use turn_queue::{EnqueueOutcome, ResetSummary, TurnQueueService};
pub use view::{project, QueueView, ViewEntry};
