// Domain Layer - Pure queue logic and entities

pub mod error;
pub mod participant;
pub mod queue;
pub mod turn;

// Re-exports
pub use error::DomainError;
pub use participant::{Participant, ParticipantId};
pub use queue::{QueueConfig, QueueId, ResetMode};
pub use turn::{
    next_sequence_key, ListKind, OrderedEntry, QueueSnapshot, QueueState, SequenceKey,
    FIRST_SEQUENCE_KEY,
};
