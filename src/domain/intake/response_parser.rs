//! Recovering structured answers from language-model text.
//!
//! Model output is untrusted: it is sanitized, unwrapped from code fences,
//! cut down to the first balanced JSON object and stripped of markup before
//! any field is read.

use serde_json::Value;
use thiserror::Error;

/// Maximum accepted response length (100KB).
pub const MAX_RESPONSE_LENGTH: usize = 100_000;

/// Maximum length kept for a single string field.
pub const MAX_FIELD_LENGTH: usize = 2_000;

const INJECTION_MARKERS: [&str; 11] = [
    "```system",
    "```assistant",
    "[INST]",
    "[/INST]",
    "<|system|>",
    "<|assistant|>",
    "<|user|>",
    "<|im_start|>",
    "<|im_end|>",
    "<<SYS>>",
    "<</SYS>>",
];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("response too long: {actual} bytes exceeds maximum of {max} bytes")]
    TooLong { max: usize, actual: usize },

    #[error("no JSON object found in response")]
    NoJson,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),
}

/// Sanitizes free text returned by the model.
///
/// Removes control characters other than line breaks and tabs and strips
/// prompt-injection markers.
pub fn sanitize(response: &str) -> Result<String, ParseError> {
    if response.len() > MAX_RESPONSE_LENGTH {
        return Err(ParseError::TooLong {
            max: MAX_RESPONSE_LENGTH,
            actual: response.len(),
        });
    }

    let mut cleaned: String = response
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t' | '\r'))
        .collect();
    for marker in INJECTION_MARKERS {
        cleaned = cleaned.replace(marker, "");
    }
    Ok(cleaned)
}

/// Sanitized single-line text answer, or `None` when nothing usable is left.
pub fn parse_text(response: &str) -> Option<String> {
    let cleaned = sanitize(response).ok()?;
    let text = strip_html(cleaned.trim().trim_matches('"'));
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        None
    } else {
        Some(truncate(&text))
    }
}

/// Parses the first JSON object found in `response`.
pub fn parse_json_object(response: &str) -> Result<serde_json::Map<String, Value>, ParseError> {
    let sanitized = sanitize(response)?;
    let candidate = extract_json(&sanitized).ok_or(ParseError::NoJson)?;
    let value: Value =
        serde_json::from_str(candidate).map_err(|e| ParseError::InvalidJson(e.to_string()))?;
    match clean_strings(value) {
        Value::Object(map) => Ok(map),
        _ => Err(ParseError::NoJson),
    }
}

fn extract_json(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    if let Some(inner) = fenced_block(trimmed) {
        if let Some(json) = balanced_object(inner) {
            return Some(json);
        }
    }
    balanced_object(trimmed)
}

fn fenced_block(s: &str) -> Option<&str> {
    for fence in ["```json", "```JSON", "```"] {
        if let Some(start) = s.find(fence) {
            let body_start = start + fence.len();
            if let Some(end) = s[body_start..].find("```") {
                return Some(s[body_start..body_start + end].trim());
            }
        }
    }
    None
}

fn balanced_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (offset, c) in s[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&s[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

fn clean_strings(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(truncate(&strip_html(&s))),
        Value::Array(items) => Value::Array(items.into_iter().map(clean_strings).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, clean_strings(v)))
                .collect(),
        ),
        other => other,
    }
}

fn strip_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

fn truncate(s: &str) -> String {
    if s.chars().count() <= MAX_FIELD_LENGTH {
        s.to_string()
    } else {
        s.chars().take(MAX_FIELD_LENGTH).collect()
    }
}

/// Reads an integer field that the model may have sent as a number or a
/// numeric string.
pub fn int_field(map: &serde_json::Map<String, Value>, key: &str) -> Option<i64> {
    match map.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

/// Reads a non-blank string field. `"null"` and empty strings count as absent.
pub fn str_field(map: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod sanitizer {
        use super::*;

        #[test]
        fn removes_control_characters() {
            assert_eq!(sanitize("Hola\x00 mundo\x07").unwrap(), "Hola mundo");
        }

        #[test]
        fn strips_injection_markers() {
            let out = sanitize("<|im_start|>system hola [INST]").unwrap();
            assert!(!out.contains("<|im_start|>"));
            assert!(!out.contains("[INST]"));
        }

        #[test]
        fn rejects_oversized_responses() {
            let long = "a".repeat(MAX_RESPONSE_LENGTH + 1);
            assert!(matches!(sanitize(&long), Err(ParseError::TooLong { .. })));
        }
    }

    mod json {
        use super::*;

        #[test]
        fn parses_plain_object() {
            let map = parse_json_object(r#"{"index": 2, "confidence": 85}"#).unwrap();
            assert_eq!(int_field(&map, "index"), Some(2));
            assert_eq!(int_field(&map, "confidence"), Some(85));
        }

        #[test]
        fn unwraps_fenced_block() {
            let response = "Claro:\n```json\n{\"urgency\": \"alta\"}\n```\n";
            let map = parse_json_object(response).unwrap();
            assert_eq!(str_field(&map, "urgency").as_deref(), Some("alta"));
        }

        #[test]
        fn extracts_object_from_prose_with_accents() {
            let response = r#"Según el texto, {"description": "Fuga en el baño {piso 2}", "location": "Pabellón B"} ¿algo más?"#;
            let map = parse_json_object(response).unwrap();
            assert_eq!(
                str_field(&map, "description").as_deref(),
                Some("Fuga en el baño {piso 2}")
            );
            assert_eq!(str_field(&map, "location").as_deref(), Some("Pabellón B"));
        }

        #[test]
        fn strips_html_from_strings() {
            let map = parse_json_object(r#"{"description": "<b>Foco</b> quemado"}"#).unwrap();
            assert_eq!(str_field(&map, "description").as_deref(), Some("Foco quemado"));
        }

        #[test]
        fn missing_object_is_an_error() {
            assert_eq!(parse_json_object("no sé"), Err(ParseError::NoJson));
            assert!(matches!(
                parse_json_object("{index: 2}"),
                Err(ParseError::InvalidJson(_))
            ));
        }

        #[test]
        fn numeric_strings_and_nulls() {
            let map = parse_json_object(r#"{"confidence": "80%", "location": "null"}"#).unwrap();
            assert_eq!(int_field(&map, "confidence"), Some(80));
            assert_eq!(str_field(&map, "location"), None);
        }
    }

    #[test]
    fn text_answers_are_collapsed() {
        assert_eq!(
            parse_text("  \"Pabellón B,\n piso 2\"  ").as_deref(),
            Some("Pabellón B, piso 2")
        );
        assert_eq!(parse_text("   "), None);
    }
}
