// src/template/token.rs

use tracing::debug;

use crate::record::RecordKind;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";
const SEP: &str = "__";

/// A parsed placeholder directive found in a prompt template.
///
/// `raw` is the exact text of the token, braces included, so injection can
/// replace every occurrence verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderToken {
    pub kind: RecordKind,
    pub requested_keys: Vec<String>,
    pub raw: String,
}

/// Scan a template for `{{KIND}}` / `{{KIND__key1__key2}}` tokens.
///
/// Pure and infallible: spans that do not parse as a known placeholder stay
/// literal text and are simply not returned. Repeated occurrences of the
/// same token are reported once; replacement handles the rest.
pub fn extract_placeholders(template: &str) -> Vec<PlaceholderToken> {
    let mut tokens: Vec<PlaceholderToken> = Vec::new();
    let mut cursor = 0;

    while let Some(open) = template[cursor..].find(OPEN) {
        let start = cursor + open;
        let inner_start = start + OPEN.len();
        let Some(close) = template[inner_start..].find(CLOSE) else {
            break; // unterminated span, nothing more to find
        };
        let inner_end = inner_start + close;
        let inner = &template[inner_start..inner_end];
        cursor = inner_end + CLOSE.len();

        match parse_inner(inner) {
            Some((kind, requested_keys)) => {
                let raw = &template[start..cursor];
                if !tokens.iter().any(|t| t.raw == raw) {
                    tokens.push(PlaceholderToken {
                        kind,
                        requested_keys,
                        raw: raw.to_string(),
                    });
                }
            }
            None => {
                debug!(span = inner, "ignoring unrecognized placeholder span");
            }
        }
    }

    tokens
}

/// Parse the text between the braces. The double underscore is both the
/// kind/keys separator and the inter-key separator, so key names can never
/// contain it; an empty segment rejects the whole span.
fn parse_inner(inner: &str) -> Option<(RecordKind, Vec<String>)> {
    let mut segments = inner.split(SEP);

    let kind = RecordKind::from_token(segments.next()?)?;

    let mut requested_keys = Vec::new();
    for segment in segments {
        if segment.is_empty() || !is_bare_identifier(segment) {
            return None;
        }
        requested_keys.push(segment.to_string());
    }

    Some((kind, requested_keys))
}

fn is_bare_identifier(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphabetic() || c == '_')
}
