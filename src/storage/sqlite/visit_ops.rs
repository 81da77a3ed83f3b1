// src/storage/sqlite/visit_ops.rs

use anyhow::Result;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::storage::traits::VisitStoreError;
use crate::visit::Visit;

/// Handles visit assignment rows. Append-only by design.
pub struct VisitOperations {
    pool: SqlitePool,
}

impl VisitOperations {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Count the conversations recorded for a user. One visit row is written
    /// per conversation at creation time and never removed.
    pub async fn count_for_user(&self, user_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM visits WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Insert a visit row. A violation of the (user_id, visit_number)
    /// uniqueness constraint maps to `DuplicateVisitNumber` so the selector
    /// can retry with a recomputed number.
    pub async fn insert_visit(
        &self,
        user_id: &str,
        conversation_id: &str,
        visit_number: i64,
    ) -> Result<(), VisitStoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO visits (user_id, conversation_id, visit_number, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(conversation_id)
        .bind(visit_number)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!(user_id, conversation_id, visit_number, "visit row inserted");
                Ok(())
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(VisitStoreError::DuplicateVisitNumber)
            }
            Err(e) => Err(VisitStoreError::Database(e)),
        }
    }

    pub async fn visit_for_conversation(&self, conversation_id: &str) -> Result<Option<Visit>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, conversation_id, visit_number, created_at
            FROM visits
            WHERE conversation_id = ?
            "#,
        )
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Visit {
            user_id: row.get("user_id"),
            conversation_id: row.get("conversation_id"),
            visit_number: row.get("visit_number"),
            created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
        }))
    }
}
