// src/prompt/mod.rs
// Prompt purposes and stored templates. The purpose tag selects which
// template variant applies to a given visit number.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which stored prompt variant a conversation should open with.
/// The first three visits get dedicated onboarding prompts; everything
/// after that is steady state. General is the catch-all fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptPurpose {
    Visit1,
    Visit2,
    Visit3,
    SteadyState,
    General,
}

impl PromptPurpose {
    /// Pure mapping from a visit number to the prompt variant it gets.
    pub fn for_visit(visit_number: i64) -> Self {
        match visit_number {
            1 => PromptPurpose::Visit1,
            2 => PromptPurpose::Visit2,
            3 => PromptPurpose::Visit3,
            _ => PromptPurpose::SteadyState,
        }
    }
}

impl std::fmt::Display for PromptPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PromptPurpose::Visit1 => "visit_1",
                PromptPurpose::Visit2 => "visit_2",
                PromptPurpose::Visit3 => "visit_3",
                PromptPurpose::SteadyState => "steady_state",
                PromptPurpose::General => "general",
            }
        )
    }
}

impl std::str::FromStr for PromptPurpose {
    type Err = ();

    /// Parse the storage representation (the `purpose` column).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "visit_1" => Ok(PromptPurpose::Visit1),
            "visit_2" => Ok(PromptPurpose::Visit2),
            "visit_3" => Ok(PromptPurpose::Visit3),
            "steady_state" => Ok(PromptPurpose::SteadyState),
            "general" => Ok(PromptPurpose::General),
            _ => Err(()),
        }
    }
}

impl Serialize for PromptPurpose {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PromptPurpose {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|_| serde::de::Error::custom(format!("unknown prompt purpose: {s}")))
    }
}

/// A stored prompt template. Content may contain placeholder tokens;
/// versioning of template text is handled outside this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub id: Option<i64>,
    pub name: String,
    pub purpose: PromptPurpose,
    pub content: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>, purpose: PromptPurpose, content: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            purpose,
            content: content.into(),
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
