// Enqueue Use Case

use crate::domain::{next_sequence_key, ListKind, OrderedEntry, Participant};
use crate::error::Result;
use crate::port::TransactionalQueueStore;
use serde::Serialize;

/// What happened when a participant asked to join
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EnqueueOutcome {
    /// New waiting entry created
    Joined(OrderedEntry),
    /// Already waiting or already went (duplicate guard hit)
    AlreadyQueued,
    /// No usable identity; nothing was written
    InvalidIdentity,
}

impl EnqueueOutcome {
    pub fn is_joined(&self) -> bool {
        matches!(self, EnqueueOutcome::Joined(_))
    }
}

/// Execute one enqueue attempt (with transaction for atomicity)
///
/// # Arguments
///
/// * `store` - Transactional queue store
/// * `queue` - Queue to join
/// * `participant` - Validated participant
/// * `allow_duplicates` - Skip the duplicate-join guard
/// * `enqueued_at` - Timestamp stamped on the entry (injected for determinism)
pub async fn execute<S>(
    store: &S,
    queue: &str,
    participant: &Participant,
    allow_duplicates: bool,
    enqueued_at: i64,
) -> Result<EnqueueOutcome>
where
    S: TransactionalQueueStore + ?Sized,
{
    // Key computation and insert must see the same state
    let mut tx = store.begin_transaction().await?;

    if !allow_duplicates && tx.contains_participant(queue, &participant.id).await? {
        tx.rollback().await?;
        return Ok(EnqueueOutcome::AlreadyQueued);
    }

    // Keys stay monotonic until reset, even after the list drains
    let last_key = tx.high_water_key(queue, ListKind::Waiting).await?;
    let entry = OrderedEntry::new(next_sequence_key(last_key), participant.clone(), enqueued_at);

    tx.insert(queue, ListKind::Waiting, &entry).await?;
    tx.commit().await?;

    Ok(EnqueueOutcome::Joined(entry))
}
