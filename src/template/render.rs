// src/template/render.rs

use thiserror::Error;
use tracing::{debug, warn};

use crate::record::{RecordKind, StructuredRecord};

/// Value substituted for a permitted key that the record data lacks.
pub const NOT_AVAILABLE: &str = "[Not available]";

/// Non-fatal conditions met while rendering a record. Every one of these is
/// recovered locally; a stale or malformed template degrades to fallback
/// text instead of breaking the conversation flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderIssue {
    #[error("key `{key}` is not permitted for {kind}")]
    InvalidKey { kind: RecordKind, key: String },
    #[error("key `{key}` is permitted for {kind} but absent from the record")]
    MissingData { kind: RecordKind, key: String },
    #[error("no {0} record available")]
    RecordUnavailable(RecordKind),
}

impl RenderIssue {
    /// Issues never propagate; they surface through tracing only.
    pub fn log(&self) {
        match self {
            RenderIssue::InvalidKey { .. } => warn!("{self}"),
            RenderIssue::MissingData { .. } => debug!("{self}"),
            RenderIssue::RecordUnavailable(_) => debug!("{self}"),
        }
    }
}

/// Render a record to the single sentence a placeholder resolves to.
///
/// With no record, the kind's fixed fallback sentence comes back regardless
/// of the requested keys. An empty request renders every permitted key in
/// schema order. Invalid keys are dropped, absent data renders
/// `[Not available]`; neither is ever an error.
pub fn render(kind: RecordKind, record: Option<&StructuredRecord>, requested_keys: &[String]) -> String {
    let (text, issues) = render_with_issues(kind, record, requested_keys);
    for issue in &issues {
        issue.log();
    }
    text
}

/// Like [`render`], but hands the issues back to the caller instead of
/// logging them. `inject` uses this to report per-token diagnostics.
pub fn render_with_issues(
    kind: RecordKind,
    record: Option<&StructuredRecord>,
    requested_keys: &[String],
) -> (String, Vec<RenderIssue>) {
    let Some(record) = record else {
        return (
            kind.fallback().to_string(),
            vec![RenderIssue::RecordUnavailable(kind)],
        );
    };

    let mut issues = Vec::new();
    let mut fragments = Vec::new();

    if requested_keys.is_empty() {
        for key in kind.permitted_keys() {
            fragments.push(fragment_for(kind, record, key, &mut issues));
        }
    } else {
        for key in requested_keys {
            if !kind.is_permitted(key) {
                issues.push(RenderIssue::InvalidKey {
                    kind,
                    key: key.clone(),
                });
                continue;
            }
            fragments.push(fragment_for(kind, record, key, &mut issues));
        }
    }

    // All requested keys invalid: the lead-in alone, never an error.
    let text = if fragments.is_empty() {
        kind.lead_in().to_string()
    } else {
        format!("{} {}.", kind.lead_in(), fragments.join(", "))
    };

    (text, issues)
}

fn fragment_for(
    kind: RecordKind,
    record: &StructuredRecord,
    key: &str,
    issues: &mut Vec<RenderIssue>,
) -> String {
    match record.get(key) {
        Some(value) => format!("`{}` is \"{}\"", key, value.render()),
        None => {
            issues.push(RenderIssue::MissingData {
                kind,
                key: key.to_string(),
            });
            format!("`{}` is {}", key, NOT_AVAILABLE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;

    fn memory_record() -> StructuredRecord {
        StructuredRecord::new(RecordKind::ConversationMemory)
            .with_field(
                "main_topics",
                FieldValue::List(vec!["volcanoes".into(), "lava".into()]),
            )
            .with_field("action", FieldValue::List(vec!["drew a diagram".into()]))
            .with_field(
                "typical_observation",
                FieldValue::Text("asks follow-up questions".into()),
            )
    }

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_null_record_renders_fallback() {
        assert_eq!(
            render(RecordKind::ConversationMemory, None, &[]),
            "Conversation memory not available."
        );
        // requested keys make no difference without a record
        assert_eq!(
            render(RecordKind::UserPersona, None, &keys(&["persona"])),
            "User persona not available."
        );
    }

    #[test]
    fn test_empty_request_renders_all_keys_in_schema_order() {
        let record = memory_record();
        let text = render(RecordKind::ConversationMemory, Some(&record), &[]);

        let topics = text.find("`main_topics`").expect("main_topics rendered");
        let action = text.find("`action`").expect("action rendered");
        let observation = text
            .find("`typical_observation`")
            .expect("typical_observation rendered");
        assert!(topics < action && action < observation);
        assert!(text.contains("volcanoes, lava"));
    }

    #[test]
    fn test_explicit_request_renders_only_those_keys() {
        let record = memory_record();
        let text = render(
            RecordKind::ConversationMemory,
            Some(&record),
            &keys(&["main_topics"]),
        );

        assert!(text.contains("volcanoes, lava"));
        assert!(!text.contains("action"));
        assert!(!text.contains("typical_observation"));
    }

    #[test]
    fn test_invalid_key_is_omitted_not_fatal() {
        let record = memory_record();
        let (text, issues) = render_with_issues(
            RecordKind::ConversationMemory,
            Some(&record),
            &keys(&["main_topics", "favorite_color"]),
        );

        assert!(text.contains("main_topics"));
        assert!(!text.contains("favorite_color"));
        assert_eq!(
            issues,
            vec![RenderIssue::InvalidKey {
                kind: RecordKind::ConversationMemory,
                key: "favorite_color".into()
            }]
        );
    }

    #[test]
    fn test_all_invalid_keys_render_near_empty_snippet() {
        let record = memory_record();
        let (text, issues) = render_with_issues(
            RecordKind::ConversationMemory,
            Some(&record),
            &keys(&["nope", "also_nope"]),
        );

        assert_eq!(text, RecordKind::ConversationMemory.lead_in());
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn test_permitted_but_absent_key_renders_not_available() {
        let record = StructuredRecord::new(RecordKind::ConversationMemory)
            .with_field("main_topics", FieldValue::List(vec!["tides".into()]));
        let (text, issues) = render_with_issues(
            RecordKind::ConversationMemory,
            Some(&record),
            &keys(&["main_topics", "action"]),
        );

        assert!(text.contains("`action` is [Not available]"));
        assert_eq!(
            issues,
            vec![RenderIssue::MissingData {
                kind: RecordKind::ConversationMemory,
                key: "action".into()
            }]
        );
    }

    #[test]
    fn test_scalar_quotes_are_escaped() {
        let record = StructuredRecord::new(RecordKind::UserPersona).with_field(
            "persona",
            FieldValue::Text(r#"loves "what if" questions"#.into()),
        );
        let text = render(RecordKind::UserPersona, Some(&record), &[]);

        assert!(text.contains(r#"loves \"what if\" questions"#));
    }
}
