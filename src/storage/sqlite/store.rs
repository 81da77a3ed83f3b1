// src/storage/sqlite/store.rs
// SqliteStore facade that delegates to focused operation modules.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use crate::chat::ChatMessage;
use crate::prompt::{PromptPurpose, PromptTemplate};
use crate::record::{RecordKind, StructuredRecord};
use crate::storage::traits::{
    MessageStore, PromptStore, RecordStore, VisitStore, VisitStoreError,
};
use crate::visit::Visit;

use super::message_ops::MessageOperations;
use super::migration;
use super::prompt_ops::PromptOperations;
use super::record_ops::RecordOperations;
use super::visit_ops::VisitOperations;

/// SQLite-backed store for every table this crate owns.
pub struct SqliteStore {
    pub pool: SqlitePool,

    // Operation modules - each handles specific concerns
    visit_ops: VisitOperations,
    record_ops: RecordOperations,
    prompt_ops: PromptOperations,
    message_ops: MessageOperations,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            visit_ops: VisitOperations::new(pool.clone()),
            record_ops: RecordOperations::new(pool.clone()),
            prompt_ops: PromptOperations::new(pool.clone()),
            message_ops: MessageOperations::new(pool.clone()),
            pool,
        }
    }

    /// Connect, then bring the schema up to date.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let store = Self::new(pool);
        store.run_migrations().await?;
        Ok(store)
    }

    /// Idempotent startup migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        migration::run_migrations(&self.pool).await
    }
}

#[async_trait]
impl VisitStore for SqliteStore {
    async fn count_for_user(&self, user_id: &str) -> Result<i64> {
        self.visit_ops.count_for_user(user_id).await
    }

    async fn insert_visit(
        &self,
        user_id: &str,
        conversation_id: &str,
        visit_number: i64,
    ) -> Result<(), VisitStoreError> {
        self.visit_ops
            .insert_visit(user_id, conversation_id, visit_number)
            .await
    }

    async fn visit_for_conversation(&self, conversation_id: &str) -> Result<Option<Visit>> {
        self.visit_ops.visit_for_conversation(conversation_id).await
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn get_record(
        &self,
        kind: RecordKind,
        subject_id: &str,
    ) -> Result<Option<StructuredRecord>> {
        self.record_ops.get_record(kind, subject_id).await
    }

    async fn save_record(&self, subject_id: &str, record: &StructuredRecord) -> Result<()> {
        self.record_ops.save_record(subject_id, record).await
    }

    async fn latest_memory_for_user(&self, user_id: &str) -> Result<Option<StructuredRecord>> {
        self.record_ops.latest_memory_for_user(user_id).await
    }

    async fn memory_coverage_for_user(&self, user_id: &str) -> Result<i64> {
        self.record_ops.memory_coverage_for_user(user_id).await
    }
}

#[async_trait]
impl PromptStore for SqliteStore {
    async fn active_template(&self, purpose: PromptPurpose) -> Result<Option<PromptTemplate>> {
        self.prompt_ops.active_template(purpose).await
    }

    async fn save_template(&self, template: &PromptTemplate) -> Result<i64> {
        self.prompt_ops.save_template(template).await
    }
}

#[async_trait]
impl MessageStore for SqliteStore {
    async fn save_message(&self, conversation_id: &str, role: &str, content: &str) -> Result<()> {
        self.message_ops
            .save_message(conversation_id, role, content)
            .await
    }

    async fn recent_messages(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>> {
        self.message_ops.recent_messages(conversation_id, limit).await
    }
}
