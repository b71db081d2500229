// SQLite QueueStore Implementation

use crate::SqliteQueueTransaction;
use async_trait::async_trait;
use nextup_core::domain::{ListKind, OrderedEntry, Participant, ParticipantId};
use nextup_core::error::{AppError, Result};
use nextup_core::port::{QueueStore, QueueStoreTransaction, TransactionalQueueStore};
use sqlx::SqlitePool;

/// Columns selected for every entry read
pub(crate) const ENTRY_COLUMNS: &str =
    "sequence_key, participant_id, display_name, photo_url, enqueued_at";

// Helper to convert sqlx::Error to AppError with structured information
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            // Extract database-specific error code and message
            if let Some(code) = db_err.code() {
                let code_str = code.as_ref();

                // SQLite error codes: https://www.sqlite.org/rescode.html
                match code_str {
                    "2067" | "1555" => {
                        // UNIQUE / PRIMARY KEY constraint failed: key taken by a concurrent writer
                        AppError::Conflict(format!(
                            "Sequence key already assigned: {} ({})",
                            db_err.message(),
                            code_str
                        ))
                    }
                    "5" | "517" | "6" | "262" => {
                        // SQLITE_BUSY, BUSY_SNAPSHOT, SQLITE_LOCKED, LOCKED_SHAREDCACHE
                        AppError::Conflict(format!(
                            "Database busy ({}): {}",
                            code_str,
                            db_err.message()
                        ))
                    }
                    "13" => {
                        // SQLITE_FULL - database or disk is full
                        AppError::Database(format!("Database full: {}", db_err.message()))
                    }
                    _ => {
                        // Other database errors
                        AppError::Database(format!(
                            "Database error [{}]: {}",
                            code_str,
                            db_err.message()
                        ))
                    }
                }
            } else {
                AppError::Database(format!("Database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => {
            AppError::Database(format!("Column not found: {}", col))
        }
        _ => {
            // Connection, pool, protocol errors
            AppError::Database(err.to_string())
        }
    }
}

pub struct SqliteQueueStore {
    pool: SqlitePool,
}

/// Takes the write lock up front. A deferred transaction that reads and
/// then writes fails with BUSY_SNAPSHOT whenever another writer committed
/// in between. An immediate one waits on the busy timeout instead.
const BEGIN_WRITE: &str = "BEGIN IMMEDIATE";

impl SqliteQueueStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

}

#[async_trait]
impl QueueStore for SqliteQueueStore {
    async fn entries(&self, queue: &str, list: ListKind) -> Result<Vec<OrderedEntry>> {
        let rows: Vec<EntryRow> = sqlx::query_as(&format!(
            "SELECT {} FROM queue_entries WHERE queue = ? AND list = ? ORDER BY sequence_key ASC",
            ENTRY_COLUMNS
        ))
        .bind(queue)
        .bind(list.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(EntryRow::into_entry).collect())
    }

    async fn count(&self, queue: &str, list: ListKind) -> Result<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM queue_entries WHERE queue = ? AND list = ?")
                .bind(queue)
                .bind(list.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(count as u64)
    }
}

#[async_trait]
impl TransactionalQueueStore for SqliteQueueStore {
    async fn begin_transaction(&self) -> Result<Box<dyn QueueStoreTransaction>> {
        let tx = self
            .pool
            .begin_with(BEGIN_WRITE)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Box::new(SqliteQueueTransaction::new(tx)))
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct EntryRow {
    sequence_key: i64,
    participant_id: String,
    display_name: String,
    photo_url: Option<String>,
    enqueued_at: i64,
}

impl EntryRow {
    pub(crate) fn into_entry(self) -> OrderedEntry {
        let participant = Participant {
            id: ParticipantId::new(self.participant_id),
            name: self.display_name,
            photo_url: self.photo_url,
        };

        OrderedEntry::new(self.sequence_key, participant, self.enqueued_at)
    }
}
