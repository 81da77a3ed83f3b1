// src/storage/sqlite/record_ops.rs

use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::record::{RecordKind, StructuredRecord};

/// Handles structured record storage: memory summaries keyed by
/// conversation, personas keyed by user.
pub struct RecordOperations {
    pool: SqlitePool,
}

impl RecordOperations {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_record(
        &self,
        kind: RecordKind,
        subject_id: &str,
    ) -> Result<Option<StructuredRecord>> {
        let payload: Option<String> = sqlx::query_scalar(
            "SELECT payload FROM structured_records WHERE kind = ? AND subject_id = ?",
        )
        .bind(kind.to_string())
        .bind(subject_id)
        .fetch_optional(&self.pool)
        .await?;

        payload
            .map(|p| StructuredRecord::from_payload(kind, &p))
            .transpose()
    }

    /// Upsert: the generation step may regenerate a record for a subject.
    pub async fn save_record(&self, subject_id: &str, record: &StructuredRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO structured_records (kind, subject_id, payload, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(kind, subject_id) DO UPDATE SET
                payload = excluded.payload
            "#,
        )
        .bind(record.kind.to_string())
        .bind(subject_id)
        .bind(record.to_payload()?)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;

        debug!(kind = %record.kind, subject_id, "structured record saved");
        Ok(())
    }

    /// The memory summary of the user's highest-numbered conversation that
    /// has one generated.
    pub async fn latest_memory_for_user(&self, user_id: &str) -> Result<Option<StructuredRecord>> {
        let payload: Option<String> = sqlx::query_scalar(
            r#"
            SELECT r.payload
            FROM structured_records r
            JOIN visits v ON v.conversation_id = r.subject_id
            WHERE v.user_id = ? AND r.kind = ?
            ORDER BY v.visit_number DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(RecordKind::ConversationMemory.to_string())
        .fetch_optional(&self.pool)
        .await?;

        payload
            .map(|p| StructuredRecord::from_payload(RecordKind::ConversationMemory, &p))
            .transpose()
    }

    /// How many of the user's conversations have a generated memory record.
    /// Used by the steady-state persona gate.
    pub async fn memory_coverage_for_user(&self, user_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM structured_records r
            JOIN visits v ON v.conversation_id = r.subject_id
            WHERE v.user_id = ? AND r.kind = ?
            "#,
        )
        .bind(user_id)
        .bind(RecordKind::ConversationMemory.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
