// src/chat/mod.rs
// Conversation engine: ties visit selection, template selection, record
// resolution, and placeholder injection into the opening exchange of a
// conversation.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::CONFIG;
use crate::llm::TextCompletion;
use crate::prompt::{PromptPurpose, PromptTemplate};
use crate::record::{RecordKind, StructuredRecord};
use crate::storage::SqliteStore;
use crate::storage::traits::{MessageStore, PromptStore, RecordStore};
use crate::template::{extract_placeholders, inject};
use crate::visit::{VisitAssignment, select_visit};

/// A persisted conversation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Option<i64>,
    pub conversation_id: String,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Everything produced when a conversation is opened.
#[derive(Debug, Clone)]
pub struct ConversationOpening {
    pub conversation_id: String,
    pub assignment: VisitAssignment,
    /// The fully injected prompt that went to the model.
    pub prompt: String,
    /// The model's opening reply, already persisted.
    pub reply: String,
}

/// Generates a new random conversation ID (UUID v4)
pub fn generate_conversation_id() -> String {
    Uuid::new_v4().to_string()
}

pub struct ConversationEngine {
    store: Arc<SqliteStore>,
    llm: Arc<dyn TextCompletion>,
    visit_retry_attempts: u32,
    memory_gate_min: i64,
}

impl ConversationEngine {
    pub fn new(store: Arc<SqliteStore>, llm: Arc<dyn TextCompletion>) -> Self {
        Self::with_limits(
            store,
            llm,
            CONFIG.visit_retry_attempts,
            CONFIG.memory_gate_min,
        )
    }

    pub fn with_limits(
        store: Arc<SqliteStore>,
        llm: Arc<dyn TextCompletion>,
        visit_retry_attempts: u32,
        memory_gate_min: i64,
    ) -> Self {
        Self {
            store,
            llm,
            visit_retry_attempts,
            memory_gate_min,
        }
    }

    /// Open a new conversation for a user.
    ///
    /// Assigns the visit number, picks the matching prompt template, resolves
    /// only the record kinds the template references, injects them, sends the
    /// result to the model, and persists the opening reply.
    pub async fn start_conversation(&self, user_id: &str) -> Result<ConversationOpening> {
        let conversation_id = generate_conversation_id();

        let assignment = select_visit(
            self.store.as_ref(),
            user_id,
            &conversation_id,
            self.visit_retry_attempts,
        )
        .await?;
        info!(user_id, %conversation_id, visit_number = assignment.visit_number,
              purpose = %assignment.purpose, "conversation opened");

        let template = self.template_for(assignment.purpose).await?;
        let records = self
            .resolve_records(&template.content, user_id, assignment.purpose)
            .await?;
        let prompt = inject(&template.content, &records);

        let reply = self
            .llm
            .complete(&prompt)
            .await
            .context("completion failed for conversation opening")?;
        self.store
            .save_message(&conversation_id, "assistant", &reply)
            .await?;

        Ok(ConversationOpening {
            conversation_id,
            assignment,
            prompt,
            reply,
        })
    }

    pub async fn record_user_message(&self, conversation_id: &str, content: &str) -> Result<()> {
        self.store
            .save_message(conversation_id, "user", content)
            .await
    }

    pub async fn recent_messages(
        &self,
        conversation_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ChatMessage>> {
        let limit = limit
            .unwrap_or(CONFIG.history_default_limit)
            .min(CONFIG.history_max_limit);
        self.store.recent_messages(conversation_id, limit).await
    }

    /// Active template for the purpose, falling back to the general one.
    async fn template_for(&self, purpose: PromptPurpose) -> Result<PromptTemplate> {
        if let Some(template) = self.store.active_template(purpose).await? {
            return Ok(template);
        }
        debug!(%purpose, "no active template for purpose, falling back to general");
        self.store
            .active_template(PromptPurpose::General)
            .await?
            .ok_or_else(|| anyhow!("no active prompt template for {purpose} or general"))
    }

    /// Fetch a record for each kind the template actually references.
    /// A token-free template fetches nothing.
    async fn resolve_records(
        &self,
        template: &str,
        user_id: &str,
        purpose: PromptPurpose,
    ) -> Result<HashMap<RecordKind, Option<StructuredRecord>>> {
        let mut records = HashMap::new();

        for token in extract_placeholders(template) {
            if records.contains_key(&token.kind) {
                continue;
            }
            let record = self.fetch_record(token.kind, user_id, purpose).await?;
            records.insert(token.kind, record);
        }

        Ok(records)
    }

    async fn fetch_record(
        &self,
        kind: RecordKind,
        user_id: &str,
        purpose: PromptPurpose,
    ) -> Result<Option<StructuredRecord>> {
        match kind {
            RecordKind::ConversationMemory => self.store.latest_memory_for_user(user_id).await,
            RecordKind::UserPersona => {
                // Steady-state persona use requires enough generated history.
                // Leaving the record unresolved degrades to the fallback
                // sentence, so the student never sees an error.
                if purpose == PromptPurpose::SteadyState
                    && !self.memory_gate_open(user_id).await?
                {
                    info!(user_id, "memory gate closed, persona withheld");
                    return Ok(None);
                }
                self.store.get_record(RecordKind::UserPersona, user_id).await
            }
        }
    }

    async fn memory_gate_open(&self, user_id: &str) -> Result<bool> {
        let coverage = self.store.memory_coverage_for_user(user_id).await?;
        Ok(coverage >= self.memory_gate_min)
    }
}
