// src/template/mod.rs
// Placeholder injection: recognize `{{KIND}}` / `{{KIND__key1__key2}}`
// directives in stored prompt templates and substitute rendered record text.

pub mod render;
pub mod token;

pub use render::{NOT_AVAILABLE, RenderIssue, render, render_with_issues};
pub use token::{PlaceholderToken, extract_placeholders};

use std::collections::HashMap;

use crate::record::{RecordKind, StructuredRecord};

/// Replace every recognized placeholder in `template` with rendered text.
///
/// A kind missing from the map (the caller never fetched it) behaves exactly
/// like an explicit `None`: the fallback sentence. Templates with no tokens
/// come back unchanged without touching the map at all. This function never
/// fails; render issues surface through tracing.
pub fn inject(template: &str, records_by_kind: &HashMap<RecordKind, Option<StructuredRecord>>) -> String {
    let tokens = extract_placeholders(template);
    if tokens.is_empty() {
        return template.to_string();
    }

    let mut output = template.to_string();
    for token in tokens {
        let record = records_by_kind.get(&token.kind).and_then(|r| r.as_ref());
        let (text, issues) = render_with_issues(token.kind, record, &token.requested_keys);
        for issue in &issues {
            issue.log();
        }
        output = output.replace(&token.raw, &text);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;

    fn records_with(
        kind: RecordKind,
        record: Option<StructuredRecord>,
    ) -> HashMap<RecordKind, Option<StructuredRecord>> {
        let mut map = HashMap::new();
        map.insert(kind, record);
        map
    }

    #[test]
    fn test_token_free_template_is_identity() {
        let template = "Hello! Ready to explore something new today?";
        assert_eq!(inject(template, &HashMap::new()), template);
    }

    #[test]
    fn test_injection_is_idempotent_on_injected_output() {
        let record = StructuredRecord::new(RecordKind::ConversationMemory)
            .with_field("main_topics", FieldValue::List(vec!["gravity".into()]));
        let records = records_with(RecordKind::ConversationMemory, Some(record));

        let once = inject("Hi! {{CONVERSATION_MEMORY__main_topics}}", &records);
        let twice = inject(&once, &records);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_every_occurrence_replaced_identically() {
        let records = records_with(RecordKind::UserPersona, None);
        let out = inject("{{USER_PERSONA}} ... {{USER_PERSONA}}", &records);

        assert_eq!(out, "User persona not available. ... User persona not available.");
    }

    #[test]
    fn test_missing_map_entry_matches_null_record() {
        let out = inject("{{USER_PERSONA}}", &HashMap::new());
        assert_eq!(out, "User persona not available.");
    }

    #[test]
    fn test_unknown_kind_stays_literal() {
        let out = inject("keep {{MYSTERY_DATA}} as-is", &HashMap::new());
        assert_eq!(out, "keep {{MYSTERY_DATA}} as-is");
    }

    #[test]
    fn test_end_to_end_memory_injection() {
        let record = StructuredRecord::new(RecordKind::ConversationMemory)
            .with_field(
                "main_topics",
                FieldValue::List(vec!["volcanoes".into(), "lava".into()]),
            )
            .with_field("action", FieldValue::List(vec!["built a model".into()]))
            .with_field("typical_observation", FieldValue::Text("very curious".into()));
        let records = records_with(RecordKind::ConversationMemory, Some(record));

        let out = inject("Hello! {{CONVERSATION_MEMORY__main_topics}}", &records);

        assert!(out.contains("Hello!"));
        assert!(out.contains("volcanoes"));
        assert!(out.contains("lava"));
        assert!(!out.contains("built a model"));
        assert!(!out.contains("very curious"));
    }
}
