// SQLite Transaction Implementation

use crate::queue_store::{map_sqlx_error, EntryRow, ENTRY_COLUMNS};
use async_trait::async_trait;
use nextup_core::domain::{ListKind, OrderedEntry, ParticipantId, SequenceKey};
use nextup_core::error::Result;
use nextup_core::port::{QueueStoreTransaction, Transaction};
use sqlx::{Sqlite, Transaction as SqlxTransaction};

pub struct SqliteQueueTransaction<'a> {
    tx: SqlxTransaction<'a, Sqlite>,
}

impl<'a> SqliteQueueTransaction<'a> {
    pub fn new(tx: SqlxTransaction<'a, Sqlite>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transaction for SqliteQueueTransaction<'_> {
    async fn commit(mut self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)?;
        Ok(())
    }
}

#[async_trait]
impl QueueStoreTransaction for SqliteQueueTransaction<'_> {
    async fn entries(&mut self, queue: &str, list: ListKind) -> Result<Vec<OrderedEntry>> {
        let rows: Vec<EntryRow> = sqlx::query_as(&format!(
            "SELECT {} FROM queue_entries WHERE queue = ? AND list = ? ORDER BY sequence_key ASC",
            ENTRY_COLUMNS
        ))
        .bind(queue)
        .bind(list.to_string())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(EntryRow::into_entry).collect())
    }

    async fn first_entry(&mut self, queue: &str, list: ListKind) -> Result<Option<OrderedEntry>> {
        let row: Option<EntryRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM queue_entries
            WHERE queue = ? AND list = ?
            ORDER BY sequence_key ASC
            LIMIT 1
            "#,
            ENTRY_COLUMNS
        ))
        .bind(queue)
        .bind(list.to_string())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(EntryRow::into_entry))
    }

    async fn max_sequence_key(
        &mut self,
        queue: &str,
        list: ListKind,
    ) -> Result<Option<SequenceKey>> {
        let max: Option<i64> = sqlx::query_scalar(
            "SELECT MAX(sequence_key) FROM queue_entries WHERE queue = ? AND list = ?",
        )
        .bind(queue)
        .bind(list.to_string())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(max)
    }

    async fn high_water_key(
        &mut self,
        queue: &str,
        list: ListKind,
    ) -> Result<Option<SequenceKey>> {
        let key: Option<i64> = sqlx::query_scalar(
            "SELECT sequence_key FROM queue_high_water WHERE queue = ? AND list = ?",
        )
        .bind(queue)
        .bind(list.to_string())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(key)
    }

    async fn contains_participant(&mut self, queue: &str, id: &ParticipantId) -> Result<bool> {
        let found: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM queue_entries WHERE queue = ? AND participant_id = ?",
        )
        .bind(queue)
        .bind(id.as_str())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(found > 0)
    }

    async fn insert(&mut self, queue: &str, list: ListKind, entry: &OrderedEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO queue_entries (
                queue, list, sequence_key,
                participant_id, display_name, photo_url, enqueued_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(queue)
        .bind(list.to_string())
        .bind(entry.sequence_key)
        .bind(entry.participant.id.as_str())
        .bind(&entry.participant.name)
        .bind(&entry.participant.photo_url)
        .bind(entry.enqueued_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        sqlx::query(
            r#"
            INSERT INTO queue_high_water (queue, list, sequence_key) VALUES (?, ?, ?)
            ON CONFLICT (queue, list)
            DO UPDATE SET sequence_key = MAX(sequence_key, excluded.sequence_key)
            "#,
        )
        .bind(queue)
        .bind(list.to_string())
        .bind(entry.sequence_key)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn remove(&mut self, queue: &str, list: ListKind, key: SequenceKey) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM queue_entries WHERE queue = ? AND list = ? AND sequence_key = ?",
        )
        .bind(queue)
        .bind(list.to_string())
        .bind(key)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear(&mut self, queue: &str, list: ListKind) -> Result<u64> {
        let result = sqlx::query("DELETE FROM queue_entries WHERE queue = ? AND list = ?")
            .bind(queue)
            .bind(list.to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM queue_high_water WHERE queue = ? AND list = ?")
            .bind(queue)
            .bind(list.to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
