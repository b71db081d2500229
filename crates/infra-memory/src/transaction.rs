// In-Memory Transaction Implementation

use crate::queue_store::{QueueLists, SharedState};
use async_trait::async_trait;
use nextup_core::domain::{ListKind, OrderedEntry, ParticipantId, SequenceKey};
use nextup_core::error::{AppError, Result};
use nextup_core::port::{QueueStoreTransaction, Transaction};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Working copy of one queue: version it was read at, plus local edits
struct Staged {
    base_version: u64,
    lists: QueueLists,
}

pub struct InMemoryQueueTransaction {
    shared: Arc<SharedState>,
    staged: HashMap<String, Staged>,
    dirty: HashSet<String>,
}

impl InMemoryQueueTransaction {
    pub(crate) fn new(shared: Arc<SharedState>) -> Self {
        Self {
            shared,
            staged: HashMap::new(),
            dirty: HashSet::new(),
        }
    }

    /// Working copy of a queue, read from shared state on first touch
    async fn staged(&mut self, queue: &str) -> &mut QueueLists {
        let staged = match self.staged.entry(queue.to_string()) {
            Entry::Occupied(slot) => slot.into_mut(),
            Entry::Vacant(slot) => {
                let state = self.shared.state.lock().await;
                let loaded = match state.queues.get(queue) {
                    Some(q) => Staged {
                        base_version: q.version,
                        lists: q.lists.clone(),
                    },
                    None => Staged {
                        base_version: 0,
                        lists: QueueLists::default(),
                    },
                };
                drop(state);
                slot.insert(loaded)
            }
        };
        &mut staged.lists
    }

    async fn staged_mut(&mut self, queue: &str) -> &mut QueueLists {
        self.dirty.insert(queue.to_string());
        self.staged(queue).await
    }
}

#[async_trait]
impl Transaction for InMemoryQueueTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        if self.dirty.is_empty() {
            return Ok(());
        }

        if self.shared.take_injected_conflict() {
            return Err(AppError::Conflict("injected commit conflict".to_string()));
        }

        let shared = Arc::clone(&self.shared);
        let mut state = shared.state.lock().await;

        // Compare: every written queue must still be at the version we read
        for queue in &self.dirty {
            let current = state.queues.get(queue).map_or(0, |q| q.version);
            let base = self.staged.get(queue).map_or(0, |s| s.base_version);
            if current != base {
                debug!(queue = %queue, base, current, "Optimistic commit lost the race");
                return Err(AppError::Conflict(format!(
                    "queue {} changed since read (version {} -> {})",
                    queue, base, current
                )));
            }
        }

        // Swap
        let Self {
            mut staged, dirty, ..
        } = *self;
        for queue in dirty {
            if let Some(s) = staged.remove(&queue) {
                let target = state.queues.entry(queue).or_default();
                target.version = s.base_version + 1;
                target.lists = s.lists;
            }
        }

        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl QueueStoreTransaction for InMemoryQueueTransaction {
    async fn entries(&mut self, queue: &str, list: ListKind) -> Result<Vec<OrderedEntry>> {
        let lists = self.staged(queue).await;
        Ok(lists.list(list).values().cloned().collect())
    }

    async fn first_entry(&mut self, queue: &str, list: ListKind) -> Result<Option<OrderedEntry>> {
        let lists = self.staged(queue).await;
        Ok(lists.list(list).values().next().cloned())
    }

    async fn max_sequence_key(
        &mut self,
        queue: &str,
        list: ListKind,
    ) -> Result<Option<SequenceKey>> {
        let lists = self.staged(queue).await;
        Ok(lists.list(list).keys().next_back().copied())
    }

    async fn high_water_key(
        &mut self,
        queue: &str,
        list: ListKind,
    ) -> Result<Option<SequenceKey>> {
        let lists = self.staged(queue).await;
        Ok(lists.high_water(list))
    }

    async fn contains_participant(&mut self, queue: &str, id: &ParticipantId) -> Result<bool> {
        let lists = self.staged(queue).await;
        Ok(lists
            .waiting
            .values()
            .chain(lists.history.values())
            .any(|e| &e.participant.id == id))
    }

    async fn insert(&mut self, queue: &str, list: ListKind, entry: &OrderedEntry) -> Result<()> {
        let lists = self.staged_mut(queue).await;
        let target = lists.list_mut(list);

        if target.contains_key(&entry.sequence_key) {
            return Err(AppError::Conflict(format!(
                "sequence key {} already taken in {} list of queue {}",
                entry.sequence_key, list, queue
            )));
        }

        target.insert(entry.sequence_key, entry.clone());

        let high_water = lists.high_water_mut(list);
        *high_water = Some(high_water.map_or(entry.sequence_key, |k| k.max(entry.sequence_key)));
        Ok(())
    }

    async fn remove(&mut self, queue: &str, list: ListKind, key: SequenceKey) -> Result<bool> {
        let lists = self.staged_mut(queue).await;
        Ok(lists.list_mut(list).remove(&key).is_some())
    }

    async fn clear(&mut self, queue: &str, list: ListKind) -> Result<u64> {
        let lists = self.staged_mut(queue).await;
        let target = lists.list_mut(list);
        let removed = target.len() as u64;
        target.clear();
        *lists.high_water_mut(list) = None;
        Ok(removed)
    }
}
