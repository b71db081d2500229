// Reset Use Case

use crate::domain::{ListKind, ResetMode};
use crate::error::Result;
use crate::port::TransactionalQueueStore;
use serde::Serialize;

/// Entries removed by a reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResetSummary {
    pub waiting_cleared: u64,
    pub history_cleared: u64,
}

/// Execute one reset attempt
pub async fn execute<S>(
    store: &S,
    queue: &str,
    mode: ResetMode,
) -> Result<ResetSummary>
where
    S: TransactionalQueueStore + ?Sized,
{
    let mut tx = store.begin_transaction().await?;

    let waiting_cleared = tx.clear(queue, ListKind::Waiting).await?;
    let history_cleared = match mode {
        ResetMode::WaitingOnly => 0,
        ResetMode::WaitingAndHistory => tx.clear(queue, ListKind::History).await?,
    };

    tx.commit().await?;

    Ok(ResetSummary {
        waiting_cleared,
        history_cleared,
    })
}
