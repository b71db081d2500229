//! Concurrent writers against one shared store
//!
//! Every writer gets its own service (one per collaborator client) over
//! the same store. Lost races surface as conflicts and are retried; the
//! final lists must never contain a double-assigned key or a dropped
//! participant.

mod common;

use common::{keyed, memory_service, participant, service_on, TempDb};
use nextup_core::application::{ConflictRetryPolicy, EnqueueOutcome, TurnQueueService};
use nextup_core::domain::{ListKind, OrderedEntry, QueueConfig};
use nextup_core::port::{QueueStore, TransactionalQueueStore};
use nextup_core::AppError;
use nextup_infra_memory::InMemoryQueueStore;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_test::{assert_err, assert_ok};

const WRITERS: usize = 16;

fn assert_keys_unique(entries: &[OrderedEntry]) {
    let keys: HashSet<_> = entries.iter().map(|e| e.sequence_key).collect();
    assert_eq!(keys.len(), entries.len(), "double-assigned key in {:?}", keyed(entries));
}

fn generous_policy() -> ConflictRetryPolicy {
    ConflictRetryPolicy::new(200, 1)
}

fn writer(store: Arc<dyn QueueStore>, queue: &str) -> TurnQueueService {
    service_on(store, QueueConfig::new(queue)).with_retry_policy(generous_policy())
}

async fn concurrent_joins(store: Arc<dyn QueueStore>, policy: ConflictRetryPolicy) {
    let mut set = JoinSet::new();
    for i in 0..WRITERS {
        let service = writer(store.clone(), "race").with_retry_policy(policy.clone());
        set.spawn(async move { service.enqueue(participant(&format!("p{i}"))).await });
    }

    let mut joined = 0;
    while let Some(result) = set.join_next().await {
        let outcome = assert_ok!(result.unwrap());
        assert!(outcome.is_joined());
        joined += 1;
    }
    assert_eq!(joined, WRITERS);

    let waiting = store.entries("race", ListKind::Waiting).await.unwrap();
    assert_eq!(waiting.len(), WRITERS);
    assert_keys_unique(&waiting);

    // Keys are exactly 1..=WRITERS in some arrival order
    let keys: Vec<_> = waiting.iter().map(|e| e.sequence_key).collect();
    assert_eq!(keys, (1..=WRITERS as i64).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_memory() {
    concurrent_joins(Arc::new(InMemoryQueueStore::new()), generous_policy()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_sqlite_file() {
    let db = TempDb::new("concurrent_joins");
    concurrent_joins(db.store().await, generous_policy()).await;

    println!("✅ {} concurrent joins, no duplicate keys", WRITERS);
}

/// The policy the CLI ships must absorb a burst of simultaneous joins
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_default_policy_absorbs_contention() {
    for round in 0..5 {
        concurrent_joins(
            Arc::new(InMemoryQueueStore::new()),
            ConflictRetryPolicy::default(),
        )
        .await;

        let db = TempDb::new(&format!("default_policy_{round}"));
        concurrent_joins(db.store().await, ConflictRetryPolicy::default()).await;
    }

    println!("✅ default retry policy: 5 rounds of {} writers, no transient failures", WRITERS);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_participant_racing_joins_once() {
    let store: Arc<dyn QueueStore> = Arc::new(InMemoryQueueStore::new());

    let mut set = JoinSet::new();
    for _ in 0..WRITERS {
        let service = writer(store.clone(), "race");
        set.spawn(async move { service.enqueue(participant("same")).await });
    }

    let mut joined = 0;
    while let Some(result) = set.join_next().await {
        match result.unwrap().unwrap() {
            EnqueueOutcome::Joined(_) => joined += 1,
            EnqueueOutcome::AlreadyQueued => {}
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    assert_eq!(joined, 1);
    assert_eq!(store.count("race", ListKind::Waiting).await.unwrap(), 1);
}

/// Joins and advances interleave; nobody is lost or served twice
async fn joins_racing_advances(store: Arc<dyn QueueStore>) {
    let mut set = JoinSet::new();
    for i in 0..WRITERS {
        let joiner = writer(store.clone(), "mixed");
        set.spawn(async move {
            joiner.enqueue(participant(&format!("p{i}"))).await.map(|_| None)
        });

        let advancer = writer(store.clone(), "mixed");
        set.spawn(async move { advancer.advance().await.map(|p| p.map(|p| p.id)) });
    }

    let mut served = Vec::new();
    while let Some(result) = set.join_next().await {
        if let Some(id) = result.unwrap().unwrap() {
            served.push(id);
        }
    }

    let waiting = store.entries("mixed", ListKind::Waiting).await.unwrap();
    let history = store.entries("mixed", ListKind::History).await.unwrap();
    assert_keys_unique(&waiting);
    assert_keys_unique(&history);
    assert_eq!(history.len(), served.len());
    assert_eq!(waiting.len() + history.len(), WRITERS);

    let everyone: HashSet<_> = waiting
        .iter()
        .chain(history.iter())
        .map(|e| e.participant.id.clone())
        .collect();
    assert_eq!(everyone.len(), WRITERS, "participant lost or duplicated");

    // Everyone served landed in history
    let served_in_history: HashSet<_> = history.iter().map(|e| e.participant.id.clone()).collect();
    assert_eq!(served_in_history, served.into_iter().collect::<HashSet<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_joins_racing_advances_memory() {
    joins_racing_advances(Arc::new(InMemoryQueueStore::new())).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_joins_racing_advances_sqlite_file() {
    let db = TempDb::new("joins_racing_advances");
    joins_racing_advances(db.store().await).await;
}

#[tokio::test]
async fn test_injected_conflicts_are_retried() {
    let (service, store) = memory_service(QueueConfig::new("flaky"));
    let service = service.with_retry_policy(ConflictRetryPolicy::new(5, 0));

    store.inject_conflicts(3);
    let outcome = assert_ok!(service.enqueue(participant("a")).await);

    let EnqueueOutcome::Joined(entry) = outcome else {
        panic!("expected join after retries");
    };
    assert_eq!(entry.sequence_key, 1);
    assert_eq!(store.pending_conflicts(), 0);
    assert_eq!(service.size().await.unwrap(), 1);
}

#[tokio::test]
async fn test_exhausted_retries_report_transient_and_leave_state_intact() {
    let (service, store) = memory_service(QueueConfig::new("flaky"));
    let service = service.with_retry_policy(ConflictRetryPolicy::new(3, 0));

    service.enqueue(participant("a")).await.unwrap();
    service.enqueue(participant("b")).await.unwrap();
    let version = store.version("flaky").await;

    store.inject_conflicts(10);
    let err = assert_err!(service.advance().await);

    assert!(err.is_transient());
    assert!(matches!(
        err,
        AppError::Transient {
            operation: "advance",
            attempts: 3
        }
    ));
    assert_eq!(store.pending_conflicts(), 7);
    assert_eq!(store.version("flaky").await, version);

    let waiting = service.waiting_entries().await.unwrap();
    assert_eq!(keyed(&waiting), vec![(1, "a".to_string()), (2, "b".to_string())]);
    assert!(service.history_entries().await.unwrap().is_empty());

    // Store recovers once conflicts stop
    store.inject_conflicts(0);
    let moved = assert_ok!(service.advance().await).unwrap();
    assert_eq!(moved.id.as_str(), "a");
}

#[tokio::test]
async fn test_stale_writer_recomputes_key() {
    let store = InMemoryQueueStore::new();
    let service = service_on(Arc::new(store.clone()), QueueConfig::new("stale"));
    service.enqueue(participant("a")).await.unwrap();

    // A transaction begun before the second join commits afterwards
    let mut stale = store.begin_transaction().await.unwrap();
    let max = stale.max_sequence_key("stale", ListKind::Waiting).await.unwrap();
    assert_eq!(max, Some(1));

    service.enqueue(participant("b")).await.unwrap();

    let entry = OrderedEntry::new(2, participant("c"), common::T0);
    stale.insert("stale", ListKind::Waiting, &entry).await.unwrap();
    let err = assert_err!(stale.commit().await);
    assert!(err.is_conflict());

    // Through the service the same join succeeds with a fresh key
    let EnqueueOutcome::Joined(entry) = service.enqueue(participant("c")).await.unwrap() else {
        panic!("c should join");
    };
    assert_eq!(entry.sequence_key, 3);
}
