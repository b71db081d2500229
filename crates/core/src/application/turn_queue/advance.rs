// Advance Use Case

use crate::domain::{next_sequence_key, ListKind, OrderedEntry, SequenceKey};
use crate::error::{AppError, Result};
use crate::port::TransactionalQueueStore;

/// Key an entry takes when it moves into history.
///
/// The waiting key is kept while it still sorts after every history key,
/// which holds until the next reset. After a waiting-only reset numbering
/// restarts at 1, so the entry is appended after the current history tail
/// instead.
pub fn history_key(waiting_key: SequenceKey, history_max: Option<SequenceKey>) -> SequenceKey {
    match history_max {
        Some(max) if waiting_key <= max => next_sequence_key(Some(max)),
        _ => waiting_key,
    }
}

/// Execute one advance attempt
///
/// Moves the minimum-key waiting entry to history and returns it as stored
/// in history. An empty waiting list leaves the store untouched.
pub async fn execute<S>(
    store: &S,
    queue: &str,
) -> Result<Option<OrderedEntry>>
where
    S: TransactionalQueueStore + ?Sized,
{
    let mut tx = store.begin_transaction().await?;

    let Some(head) = tx.first_entry(queue, ListKind::Waiting).await? else {
        tx.rollback().await?;
        return Ok(None);
    };

    if !tx.remove(queue, ListKind::Waiting, head.sequence_key).await? {
        // Someone else moved it between our read and delete
        return Err(AppError::Conflict(format!(
            "waiting entry {} in queue {} disappeared",
            head.sequence_key, queue
        )));
    }

    let history_max = tx.max_sequence_key(queue, ListKind::History).await?;
    let key = history_key(head.sequence_key, history_max);
    let moved = head.rekeyed(key);

    tx.insert(queue, ListKind::History, &moved).await?;
    tx.commit().await?;

    Ok(Some(moved))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_key_preserved_within_round() {
        assert_eq!(history_key(1, None), 1);
        assert_eq!(history_key(4, Some(3)), 4);
    }

    #[test]
    fn test_history_key_appends_after_restart() {
        // history [1, 2, 3], waiting restarted at 1
        assert_eq!(history_key(1, Some(3)), 4);
        assert_eq!(history_key(3, Some(3)), 4);
    }
}
