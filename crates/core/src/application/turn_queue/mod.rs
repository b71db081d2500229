// Turn Queue Service - Core use cases for the shared turn queue

pub mod advance;
pub mod enqueue;
pub mod reset;

pub use enqueue::EnqueueOutcome;
pub use reset::ResetSummary;

use crate::application::retry::ConflictRetryPolicy;
use crate::application::view::{self, QueueView};
use crate::domain::{ListKind, OrderedEntry, Participant, QueueConfig, QueueSnapshot, QueueState};
use crate::error::Result;
use crate::port::{IdentityProvider, QueueStore, TimeProvider};
use std::sync::Arc;
use tracing::{debug, info};

/// Turn Queue Service
///
/// Single entry point for one queue. Every mutation runs as one store
/// transaction and is re-run from a fresh read when the store reports a
/// conflict.
pub struct TurnQueueService {
    config: QueueConfig,
    store: Arc<dyn QueueStore>,
    identity_provider: Arc<dyn IdentityProvider>,
    time_provider: Arc<dyn TimeProvider>,
    retry_policy: ConflictRetryPolicy,
}

impl TurnQueueService {
    pub fn new(
        config: QueueConfig,
        store: Arc<dyn QueueStore>,
        identity_provider: Arc<dyn IdentityProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            store,
            identity_provider,
            time_provider,
            retry_policy: ConflictRetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry_policy: ConflictRetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Add a participant to the end of the waiting list
    ///
    /// Blank identities and duplicate joins are silent no-ops reported
    /// through the outcome, not as errors.
    pub async fn enqueue(&self, participant: Participant) -> Result<EnqueueOutcome> {
        if let Err(e) = participant.validate() {
            debug!(queue = %self.config.name, error = %e, "Ignoring enqueue without identity");
            return Ok(EnqueueOutcome::InvalidIdentity);
        }

        let store = self.store.as_ref();
        let queue = self.config.name.as_str();
        let participant = &participant;
        let allow_duplicates = self.config.allow_duplicates;
        let enqueued_at = self.time_provider.now_millis();

        let outcome = self
            .retry_policy
            .run("enqueue", queue, move || {
                enqueue::execute(store, queue, participant, allow_duplicates, enqueued_at)
            })
            .await?;

        match &outcome {
            EnqueueOutcome::Joined(entry) => info!(
                queue,
                participant_id = %entry.participant.id,
                sequence_key = entry.sequence_key,
                "Participant joined"
            ),
            EnqueueOutcome::AlreadyQueued => debug!(
                queue,
                participant_id = %participant.id,
                "Participant already queued, ignoring"
            ),
            EnqueueOutcome::InvalidIdentity => {}
        }

        Ok(outcome)
    }

    /// Enqueue whoever the identity provider says is calling
    pub async fn join(&self) -> Result<EnqueueOutcome> {
        match self.identity_provider.current_participant() {
            Some(participant) => self.enqueue(participant).await,
            None => {
                debug!(queue = %self.config.name, "No current participant, ignoring join");
                Ok(EnqueueOutcome::InvalidIdentity)
            }
        }
    }

    /// Move the active participant into history
    ///
    /// Returns the participant whose turn just ended, or None when nobody
    /// is waiting.
    pub async fn advance(&self) -> Result<Option<Participant>> {
        let store = self.store.as_ref();
        let queue = self.config.name.as_str();

        let moved = self
            .retry_policy
            .run("advance", queue, move || advance::execute(store, queue))
            .await?;

        match &moved {
            Some(entry) => info!(
                queue,
                participant_id = %entry.participant.id,
                sequence_key = entry.sequence_key,
                "Turn advanced"
            ),
            None => debug!(queue, "Advance on empty queue, nothing to do"),
        }

        Ok(moved.map(|entry| entry.participant))
    }

    /// Clear the queue according to the configured reset mode
    pub async fn reset(&self) -> Result<ResetSummary> {
        let store = self.store.as_ref();
        let queue = self.config.name.as_str();
        let mode = self.config.reset_mode;

        let summary = self
            .retry_policy
            .run("reset", queue, move || reset::execute(store, queue, mode))
            .await?;

        info!(
            queue,
            mode = %mode,
            waiting_cleared = summary.waiting_cleared,
            history_cleared = summary.history_cleared,
            "Queue reset"
        );

        Ok(summary)
    }

    /// Participant whose turn it is
    pub async fn active_participant(&self) -> Result<Option<Participant>> {
        let waiting = self.waiting_entries().await?;
        Ok(waiting.into_iter().next().map(|e| e.participant))
    }

    /// Everyone waiting after the active participant, in turn order
    pub async fn waiting_excluding_active(&self) -> Result<Vec<Participant>> {
        let waiting = self.waiting_entries().await?;
        Ok(waiting.into_iter().skip(1).map(|e| e.participant).collect())
    }

    /// Everyone who already went, oldest first
    pub async fn history_in_order(&self) -> Result<Vec<Participant>> {
        let history = self.history_entries().await?;
        Ok(history.into_iter().map(|e| e.participant).collect())
    }

    pub async fn waiting_entries(&self) -> Result<Vec<OrderedEntry>> {
        self.store.entries(&self.config.name, ListKind::Waiting).await
    }

    pub async fn history_entries(&self) -> Result<Vec<OrderedEntry>> {
        self.store.entries(&self.config.name, ListKind::History).await
    }

    /// Number of waiting participants (active included)
    pub async fn size(&self) -> Result<usize> {
        let count = self.store.count(&self.config.name, ListKind::Waiting).await?;
        Ok(count as usize)
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.size().await? == 0)
    }

    pub async fn state(&self) -> Result<QueueState> {
        Ok(QueueState::from_waiting_len(self.size().await?))
    }

    /// Both lists from a single transaction
    pub async fn snapshot(&self) -> Result<QueueSnapshot> {
        let store = self.store.as_ref();
        let queue = self.config.name.as_str();

        self.retry_policy
            .run("snapshot", queue, move || async move {
                let mut tx = store.begin_transaction().await?;
                let waiting = tx.entries(queue, ListKind::Waiting).await?;
                let history = tx.entries(queue, ListKind::History).await?;
                tx.rollback().await?;
                Ok(QueueSnapshot::new(waiting, history))
            })
            .await
    }

    /// Render-ready projection of the current snapshot
    pub async fn view(&self) -> Result<QueueView> {
        let snapshot = self.snapshot().await?;
        Ok(view::project(&snapshot, self.config.row_width))
    }
}
