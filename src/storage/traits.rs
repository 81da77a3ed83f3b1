// src/storage/traits.rs
// Store seams. The engine and the selector talk to these traits so tests
// (and alternative backends) can substitute implementations.

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::chat::ChatMessage;
use crate::prompt::{PromptPurpose, PromptTemplate};
use crate::record::{RecordKind, StructuredRecord};
use crate::visit::Visit;

/// Failure modes of the visit insert. The duplicate case is the signal the
/// retry loop keys on; everything else is an ordinary database failure.
#[derive(Debug, Error)]
pub enum VisitStoreError {
    #[error("visit number already assigned for this user")]
    DuplicateVisitNumber,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Append-only visit assignment storage.
#[async_trait]
pub trait VisitStore: Send + Sync {
    /// Number of conversations recorded for this user. Visit rows are never
    /// deleted, so this count is stable even when conversations are removed.
    async fn count_for_user(&self, user_id: &str) -> Result<i64>;

    /// Insert `(user_id, conversation_id, visit_number)` under the
    /// uniqueness constraint on `(user_id, visit_number)`.
    async fn insert_visit(
        &self,
        user_id: &str,
        conversation_id: &str,
        visit_number: i64,
    ) -> Result<(), VisitStoreError>;

    async fn visit_for_conversation(&self, conversation_id: &str) -> Result<Option<Visit>>;
}

/// Read (and, for the external generator, write) access to structured records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_record(&self, kind: RecordKind, subject_id: &str) -> Result<Option<StructuredRecord>>;

    /// Upsert a record for its subject. Called by the generation step, not
    /// by injection.
    async fn save_record(&self, subject_id: &str, record: &StructuredRecord) -> Result<()>;

    /// The memory record of the user's most recent conversation that has one.
    async fn latest_memory_for_user(&self, user_id: &str) -> Result<Option<StructuredRecord>>;

    /// How many of the user's conversations have a generated memory record.
    async fn memory_coverage_for_user(&self, user_id: &str) -> Result<i64>;
}

/// Stored prompt template access.
#[async_trait]
pub trait PromptStore: Send + Sync {
    /// Most recent active template for a purpose, if any.
    async fn active_template(&self, purpose: PromptPurpose) -> Result<Option<PromptTemplate>>;

    async fn save_template(&self, template: &PromptTemplate) -> Result<i64>;
}

/// Conversation message persistence.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn save_message(&self, conversation_id: &str, role: &str, content: &str) -> Result<()>;

    /// Most recent messages, oldest first.
    async fn recent_messages(&self, conversation_id: &str, limit: usize) -> Result<Vec<ChatMessage>>;
}
