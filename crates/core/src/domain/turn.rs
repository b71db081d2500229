// Turn Queue Domain Model

use super::participant::Participant;
use serde::{Deserialize, Serialize};

/// Position of an entry inside one list (monotonic until reset)
pub type SequenceKey = i64;

/// Key assigned to the first entry of an empty list
pub const FIRST_SEQUENCE_KEY: SequenceKey = 1;

/// The two lists a queue is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListKind {
    /// Participants yet to take their turn
    Waiting,
    /// Participants who already went
    History,
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListKind::Waiting => write!(f, "WAITING"),
            ListKind::History => write!(f, "HISTORY"),
        }
    }
}

/// A participant pinned to a sequence key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedEntry {
    pub sequence_key: SequenceKey,
    pub participant: Participant,
    pub enqueued_at: i64, // epoch ms
}

impl OrderedEntry {
    pub fn new(sequence_key: SequenceKey, participant: Participant, enqueued_at: i64) -> Self {
        Self {
            sequence_key,
            participant,
            enqueued_at,
        }
    }

    /// Same entry under a different key (used when moving between lists)
    pub fn rekeyed(self, sequence_key: SequenceKey) -> Self {
        Self {
            sequence_key,
            ..self
        }
    }
}

/// Key for the next entry appended after `max_key`
pub fn next_sequence_key(max_key: Option<SequenceKey>) -> SequenceKey {
    max_key.map_or(FIRST_SEQUENCE_KEY, |k| k + 1)
}

/// Coarse queue state, derived from the waiting list length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueState {
    Empty,
    HasActive,
    HasActiveAndWaiting,
}

impl QueueState {
    pub fn from_waiting_len(len: usize) -> Self {
        match len {
            0 => QueueState::Empty,
            1 => QueueState::HasActive,
            _ => QueueState::HasActiveAndWaiting,
        }
    }
}

impl std::fmt::Display for QueueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueState::Empty => write!(f, "EMPTY"),
            QueueState::HasActive => write!(f, "HAS_ACTIVE"),
            QueueState::HasActiveAndWaiting => write!(f, "HAS_ACTIVE_AND_WAITING"),
        }
    }
}

/// Both lists of one queue, read together.
///
/// Entries are kept in ascending key order; every accessor is a pure read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub waiting: Vec<OrderedEntry>,
    pub history: Vec<OrderedEntry>,
}

impl QueueSnapshot {
    pub fn new(mut waiting: Vec<OrderedEntry>, mut history: Vec<OrderedEntry>) -> Self {
        waiting.sort_by_key(|e| e.sequence_key);
        history.sort_by_key(|e| e.sequence_key);
        Self { waiting, history }
    }

    /// Minimum-key waiting entry
    pub fn active(&self) -> Option<&OrderedEntry> {
        self.waiting.first()
    }

    pub fn waiting_excluding_active(&self) -> &[OrderedEntry] {
        self.waiting.get(1..).unwrap_or(&[])
    }

    pub fn history_in_order(&self) -> &[OrderedEntry] {
        &self.history
    }

    pub fn state(&self) -> QueueState {
        QueueState::from_waiting_len(self.waiting.len())
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }
}
