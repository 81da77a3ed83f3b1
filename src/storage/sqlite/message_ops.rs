// src/storage/sqlite/message_ops.rs

use anyhow::Result;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::chat::ChatMessage;

/// Handles conversation message persistence.
pub struct MessageOperations {
    pool: SqlitePool,
}

impl MessageOperations {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn save_message(
        &self,
        conversation_id: &str,
        role: &str,
        content: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO chat_messages (conversation_id, role, content, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(conversation_id)
        .bind(role)
        .bind(content)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn recent_messages(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>> {
        let rows = sqlx::query(
            r#"
            SELECT id, conversation_id, role, content, created_at
            FROM chat_messages
            WHERE conversation_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(conversation_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        // Reverse to get oldest->newest order
        Ok(rows
            .into_iter()
            .map(|row| ChatMessage {
                id: Some(row.get("id")),
                conversation_id: row.get("conversation_id"),
                role: row.get("role"),
                content: row.get("content"),
                created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
            })
            .rev()
            .collect())
    }
}
