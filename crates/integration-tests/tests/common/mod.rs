//! Shared wiring for integration tests

#![allow(dead_code)]

use nextup_core::application::{ConflictRetryPolicy, TurnQueueService};
use nextup_core::domain::{OrderedEntry, Participant, QueueConfig, SequenceKey};
use nextup_core::port::time_provider::mocks::FixedTimeProvider;
use nextup_core::port::{AnonymousIdentityProvider, IdentityProvider, QueueStore};
use nextup_infra_memory::InMemoryQueueStore;
use nextup_infra_sqlite::{create_pool, run_migrations, SqliteQueueStore};
use std::path::PathBuf;
use std::sync::Arc;

pub const T0: i64 = 1_700_000_000_000;

pub fn participant(id: &str) -> Participant {
    Participant::new(id, id.to_uppercase())
}

pub fn service_on(store: Arc<dyn QueueStore>, config: QueueConfig) -> TurnQueueService {
    service_with_identity(store, config, Arc::new(AnonymousIdentityProvider))
}

pub fn service_with_identity(
    store: Arc<dyn QueueStore>,
    config: QueueConfig,
    identity: Arc<dyn IdentityProvider>,
) -> TurnQueueService {
    TurnQueueService::new(config, store, identity, Arc::new(FixedTimeProvider::new(T0)))
        .unwrap()
        .with_retry_policy(ConflictRetryPolicy::new(64, 0))
}

pub fn memory_service(config: QueueConfig) -> (TurnQueueService, InMemoryQueueStore) {
    let store = InMemoryQueueStore::new();
    (service_on(Arc::new(store.clone()), config), store)
}

pub async fn sqlite_memory_store() -> Arc<SqliteQueueStore> {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();
    Arc::new(SqliteQueueStore::new(pool))
}

/// Both backends, so scenarios run against each
pub async fn all_stores() -> Vec<(&'static str, Arc<dyn QueueStore>)> {
    vec![
        ("memory", Arc::new(InMemoryQueueStore::new()) as Arc<dyn QueueStore>),
        ("sqlite", sqlite_memory_store().await as Arc<dyn QueueStore>),
    ]
}

/// File-backed database unique to this test process, removed on drop
pub struct TempDb {
    pub path: PathBuf,
}

impl TempDb {
    pub fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "nextup_{}_{}.db",
            name,
            std::process::id()
        ));
        let db = Self { path };
        db.cleanup();
        db
    }

    pub fn url(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    pub async fn store(&self) -> Arc<SqliteQueueStore> {
        let pool = create_pool(&self.url()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        Arc::new(SqliteQueueStore::new(pool))
    }

    fn cleanup(&self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", self.path.display(), suffix));
        }
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// (key, id) pairs in list order
pub fn keyed(entries: &[OrderedEntry]) -> Vec<(SequenceKey, String)> {
    entries
        .iter()
        .map(|e| (e.sequence_key, e.participant.id.as_str().to_string()))
        .collect()
}

pub fn ids(participants: &[Participant]) -> Vec<String> {
    participants
        .iter()
        .map(|p| p.id.as_str().to_string())
        .collect()
}

pub async fn lists(
    service: &TurnQueueService,
) -> (Vec<(SequenceKey, String)>, Vec<(SequenceKey, String)>) {
    let snapshot = service.snapshot().await.unwrap();
    (keyed(&snapshot.waiting), keyed(&snapshot.history))
}
