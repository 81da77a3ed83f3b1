// src/storage/sqlite/migration.rs
//! Handles migrations for SQLite: ensures all core tables match the latest
//! schema. Run this at startup to guarantee schema compatibility.

use anyhow::Result;
use sqlx::{Executor, SqlitePool};

/// Visit assignments. Append-only: rows are never updated or deleted, so
/// visit numbers survive conversation deletion and gaps are expected.
/// The unique index on (user_id, visit_number) is the sole concurrency
/// control for assignment.
const CREATE_VISITS: &str = r#"
CREATE TABLE IF NOT EXISTS visits (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    conversation_id TEXT NOT NULL UNIQUE,
    visit_number INTEGER NOT NULL,
    created_at DATETIME NOT NULL,
    UNIQUE (user_id, visit_number)
);
"#;

/// Structured records generated outside this crate: one memory summary per
/// conversation, one persona per user. subject_id is the conversation or
/// user the record describes, depending on kind.
const CREATE_STRUCTURED_RECORDS: &str = r#"
CREATE TABLE IF NOT EXISTS structured_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    kind TEXT NOT NULL,
    subject_id TEXT NOT NULL,
    payload TEXT NOT NULL,
    created_at DATETIME NOT NULL,
    UNIQUE (kind, subject_id)
);
"#;

/// Stored prompt templates, tagged with the purpose they serve.
const CREATE_PROMPTS: &str = r#"
CREATE TABLE IF NOT EXISTS prompts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    purpose TEXT NOT NULL,
    content TEXT NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT 1,
    created_at DATETIME NOT NULL
);
"#;

const CREATE_CHAT_MESSAGES: &str = r#"
CREATE TABLE IF NOT EXISTS chat_messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    conversation_id TEXT NOT NULL,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at DATETIME NOT NULL
);
"#;

const CREATE_INDICES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_visits_user_id ON visits(user_id);
CREATE INDEX IF NOT EXISTS idx_records_subject ON structured_records(subject_id);
CREATE INDEX IF NOT EXISTS idx_prompts_purpose ON prompts(purpose, is_active);
CREATE INDEX IF NOT EXISTS idx_messages_conversation ON chat_messages(conversation_id);
"#;

/// Runs all required migrations for the SQLite backend.
/// Safe to call at every startup (idempotent).
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    pool.execute(CREATE_VISITS).await?;
    pool.execute(CREATE_STRUCTURED_RECORDS).await?;
    pool.execute(CREATE_PROMPTS).await?;
    pool.execute(CREATE_CHAT_MESSAGES).await?;
    pool.execute(CREATE_INDICES).await?;
    Ok(())
}
