// src/storage/sqlite/prompt_ops.rs

use anyhow::{Result, anyhow};
use sqlx::{Row, SqlitePool};

use crate::prompt::{PromptPurpose, PromptTemplate};

/// Handles stored prompt template rows.
pub struct PromptOperations {
    pool: SqlitePool,
}

impl PromptOperations {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Most recently created active template for a purpose.
    pub async fn active_template(&self, purpose: PromptPurpose) -> Result<Option<PromptTemplate>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, purpose, content, is_active, created_at
            FROM prompts
            WHERE purpose = ? AND is_active = 1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(purpose.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::template_from_row).transpose()
    }

    pub async fn save_template(&self, template: &PromptTemplate) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO prompts (name, purpose, content, is_active, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&template.name)
        .bind(template.purpose.to_string())
        .bind(&template.content)
        .bind(template.is_active)
        .bind(template.created_at.naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    fn template_from_row(row: sqlx::sqlite::SqliteRow) -> Result<PromptTemplate> {
        let purpose: String = row.get("purpose");
        let purpose = purpose
            .parse::<PromptPurpose>()
            .map_err(|_| anyhow!("unknown prompt purpose in store: {purpose}"))?;

        Ok(PromptTemplate {
            id: Some(row.get("id")),
            name: row.get("name"),
            purpose,
            content: row.get("content"),
            is_active: row.get("is_active"),
            created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
        })
    }
}
