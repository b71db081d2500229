// In-Memory QueueStore Implementation

use crate::InMemoryQueueTransaction;
use async_trait::async_trait;
use nextup_core::domain::{ListKind, OrderedEntry, SequenceKey};
use nextup_core::error::Result;
use nextup_core::port::{QueueStore, QueueStoreTransaction, TransactionalQueueStore};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Both lists of one queue, keyed by sequence key
#[derive(Debug, Clone, Default)]
pub(crate) struct QueueLists {
    pub waiting: BTreeMap<SequenceKey, OrderedEntry>,
    pub history: BTreeMap<SequenceKey, OrderedEntry>,
    /// Highest key inserted since the last clear, per list
    pub waiting_high_water: Option<SequenceKey>,
    pub history_high_water: Option<SequenceKey>,
}

impl QueueLists {
    pub fn list(&self, list: ListKind) -> &BTreeMap<SequenceKey, OrderedEntry> {
        match list {
            ListKind::Waiting => &self.waiting,
            ListKind::History => &self.history,
        }
    }

    pub fn list_mut(&mut self, list: ListKind) -> &mut BTreeMap<SequenceKey, OrderedEntry> {
        match list {
            ListKind::Waiting => &mut self.waiting,
            ListKind::History => &mut self.history,
        }
    }

    pub fn high_water(&self, list: ListKind) -> Option<SequenceKey> {
        match list {
            ListKind::Waiting => self.waiting_high_water,
            ListKind::History => self.history_high_water,
        }
    }

    pub fn high_water_mut(&mut self, list: ListKind) -> &mut Option<SequenceKey> {
        match list {
            ListKind::Waiting => &mut self.waiting_high_water,
            ListKind::History => &mut self.history_high_water,
        }
    }
}

/// One queue plus the version bumped on every successful commit
#[derive(Debug, Clone, Default)]
pub(crate) struct VersionedQueue {
    pub version: u64,
    pub lists: QueueLists,
}

#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub queues: HashMap<String, VersionedQueue>,
}

pub(crate) struct SharedState {
    pub state: Mutex<StoreState>,
    /// Commits still to be failed with a conflict (fault injection)
    pub injected_conflicts: AtomicU32,
}

impl SharedState {
    /// Consume one injected conflict if any are left
    pub fn take_injected_conflict(&self) -> bool {
        self.injected_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

/// Shared ordered store held in process memory.
///
/// Transactions work on a private copy of the queues they touch and
/// commit with compare-and-swap on each queue's version: if another
/// transaction committed to the same queue first, commit fails with
/// `AppError::Conflict` and nothing is written. Clones share state.
#[derive(Clone)]
pub struct InMemoryQueueStore {
    shared: Arc<SharedState>,
}

impl InMemoryQueueStore {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(SharedState {
                state: Mutex::new(StoreState::default()),
                injected_conflicts: AtomicU32::new(0),
            }),
        }
    }

    /// Fail the next `count` commits with a conflict
    pub fn inject_conflicts(&self, count: u32) {
        self.shared.injected_conflicts.store(count, Ordering::SeqCst);
    }

    /// Injected conflicts not yet consumed
    pub fn pending_conflicts(&self) -> u32 {
        self.shared.injected_conflicts.load(Ordering::SeqCst)
    }

    /// Committed version of a queue (0 before its first commit)
    pub async fn version(&self, queue: &str) -> u64 {
        let state = self.shared.state.lock().await;
        state.queues.get(queue).map_or(0, |q| q.version)
    }
}

impl Default for InMemoryQueueStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionalQueueStore for InMemoryQueueStore {
    async fn begin_transaction(&self) -> Result<Box<dyn QueueStoreTransaction>> {
        Ok(Box::new(InMemoryQueueTransaction::new(Arc::clone(
            &self.shared,
        ))))
    }
}

#[async_trait]
impl QueueStore for InMemoryQueueStore {
    async fn entries(&self, queue: &str, list: ListKind) -> Result<Vec<OrderedEntry>> {
        let state = self.shared.state.lock().await;
        Ok(state
            .queues
            .get(queue)
            .map(|q| q.lists.list(list).values().cloned().collect())
            .unwrap_or_default())
    }

    async fn count(&self, queue: &str, list: ListKind) -> Result<u64> {
        let state = self.shared.state.lock().await;
        Ok(state
            .queues
            .get(queue)
            .map_or(0, |q| q.lists.list(list).len() as u64))
    }
}
