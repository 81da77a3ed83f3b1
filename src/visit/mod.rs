// src/visit/mod.rs
// Visit assignment: give each new conversation a stable, race-free visit
// number and the prompt purpose that goes with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::prompt::PromptPurpose;
use crate::storage::traits::{VisitStore, VisitStoreError};

/// Immutable association between a conversation and its chronological slot
/// for the user. Never mutated or renumbered; deleting a conversation leaves
/// a gap, which is expected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub user_id: String,
    pub conversation_id: String,
    pub visit_number: i64,
    pub created_at: DateTime<Utc>,
}

/// What `select_visit` hands back: the assigned number and the prompt
/// variant it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitAssignment {
    pub visit_number: i64,
    pub purpose: PromptPurpose,
}

#[derive(Debug, Error)]
pub enum VisitError {
    /// The insert kept hitting the uniqueness constraint. Transient by
    /// nature; callers should surface this as retryable.
    #[error("visit assignment still conflicting after {attempts} attempts")]
    ConcurrencyExhausted { attempts: u32 },
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Assign the next visit number to a new conversation.
///
/// Computes `prior count + 1` and inserts under the unique constraint on
/// `(user_id, visit_number)`. A duplicate means a concurrent creation won
/// the slot first: recompute and retry, up to `max_attempts`. No locks are
/// taken; the constraint is the whole concurrency-control story.
pub async fn select_visit<S>(
    store: &S,
    user_id: &str,
    conversation_id: &str,
    max_attempts: u32,
) -> Result<VisitAssignment, VisitError>
where
    S: VisitStore + ?Sized,
{
    let attempts = max_attempts.max(1);

    for attempt in 1..=attempts {
        let prior = store.count_for_user(user_id).await?;
        let visit_number = prior + 1;

        match store.insert_visit(user_id, conversation_id, visit_number).await {
            Ok(()) => {
                let purpose = PromptPurpose::for_visit(visit_number);
                debug!(user_id, visit_number, %purpose, "visit recorded");
                return Ok(VisitAssignment {
                    visit_number,
                    purpose,
                });
            }
            Err(VisitStoreError::DuplicateVisitNumber) => {
                warn!(
                    user_id,
                    visit_number, attempt, "visit number taken by a concurrent creation, retrying"
                );
            }
            Err(VisitStoreError::Database(e)) => return Err(VisitError::Store(e.into())),
        }
    }

    Err(VisitError::ConcurrencyExhausted { attempts })
}
