// src/record/mod.rs
// Structured records: flat, schema-constrained key-value documents produced
// by an external generation step (memory summaries, learner personas).
// Read-only from this crate's perspective once generated.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The closed set of structured record types Curio knows how to inject.
/// Each kind carries its own permitted-key allow-list, lead-in phrase,
/// and fallback sentence as static tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    ConversationMemory, // per-conversation summary of what was discussed
    UserPersona,        // per-user description of the learner
}

impl RecordKind {
    pub const ALL: [RecordKind; 2] = [RecordKind::ConversationMemory, RecordKind::UserPersona];

    /// The identifier used inside placeholder tokens, e.g. `{{CONVERSATION_MEMORY}}`.
    pub fn token_name(&self) -> &'static str {
        match self {
            RecordKind::ConversationMemory => "CONVERSATION_MEMORY",
            RecordKind::UserPersona => "USER_PERSONA",
        }
    }

    /// Resolve a placeholder identifier back to a kind.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.token_name() == token)
    }

    /// Permitted keys for this kind, in canonical render order.
    pub fn permitted_keys(&self) -> &'static [&'static str] {
        match self {
            RecordKind::ConversationMemory => &["main_topics", "action", "typical_observation"],
            RecordKind::UserPersona => &["persona"],
        }
    }

    pub fn is_permitted(&self, key: &str) -> bool {
        self.permitted_keys().contains(&key)
    }

    /// Short phrase that opens the rendered sentence for this kind.
    pub fn lead_in(&self) -> &'static str {
        match self {
            RecordKind::ConversationMemory => "Summary of a previous conversation:",
            RecordKind::UserPersona => "What we know about this learner:",
        }
    }

    /// Fixed sentence substituted when no record is available.
    pub fn fallback(&self) -> &'static str {
        match self {
            RecordKind::ConversationMemory => "Conversation memory not available.",
            RecordKind::UserPersona => "User persona not available.",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RecordKind::ConversationMemory => "conversation_memory",
                RecordKind::UserPersona => "user_persona",
            }
        )
    }
}

impl std::str::FromStr for RecordKind {
    type Err = ();

    /// Parse the storage representation (the `kind` column).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conversation_memory" => Ok(RecordKind::ConversationMemory),
            "user_persona" => Ok(RecordKind::UserPersona),
            _ => Err(()),
        }
    }
}

/// A single field of a structured record: scalar text or a sequence of text.
/// Untagged so the JSON payload column stays a plain document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Natural-language rendering: sequences join with ", ", scalars escape
    /// embedded quotes so the value cannot break the surrounding sentence.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(s) => s.replace('"', "\\\""),
            FieldValue::List(items) => items.join(", "),
        }
    }
}

/// A named flat key-value document, e.g. a conversation memory or a persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredRecord {
    pub kind: RecordKind,
    pub fields: HashMap<String, FieldValue>,
}

impl StructuredRecord {
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            fields: HashMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Deserialize a record from its stored JSON payload.
    pub fn from_payload(kind: RecordKind, payload: &str) -> Result<Self> {
        let fields: HashMap<String, FieldValue> = serde_json::from_str(payload)
            .map_err(|e| anyhow!("malformed {kind} payload: {e}"))?;
        Ok(Self { kind, fields })
    }

    /// Serialize the fields to the JSON payload column representation.
    pub fn to_payload(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.fields)?)
    }
}

// RecordKind serializes as its storage name so records embed cleanly in JSON.
impl Serialize for RecordKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|_| serde::de::Error::custom(format!("unknown record kind: {s}")))
    }
}
