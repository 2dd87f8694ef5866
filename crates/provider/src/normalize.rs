// Response normalization
//
// Model output is semi-structured: sometimes bare JSON, sometimes wrapped in a
// markdown fence, sometimes surrounded by prose. Recovery strategies run in a
// fixed order and the first successful parse wins:
//
//   1. the whole (trimmed) text
//   2. the first ```json fenced block
//   3. the first fenced block with any tag
//   4. the span from the first '{' to the last '}'

use docdiff_core::{ChangeAction, ChangeType, DiffItem, DiffPayload};
use serde_json::{Map, Value};

use crate::error::CompareError;

/// Summary used when the model omits one.
pub const NO_SUMMARY: &str = "No summary provided.";

/// Recover a JSON value from raw completion text.
pub fn extract_json(raw: &str) -> Result<Value, CompareError> {
    let text = raw.trim();

    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Ok(value);
    }

    let blocks = fenced_blocks(text);

    if let Some((_, body)) = blocks.iter().find(|(tag, _)| tag.eq_ignore_ascii_case("json")) {
        if let Ok(value) = serde_json::from_str::<Value>(body) {
            log::debug!("recovered JSON from ```json fence");
            return Ok(value);
        }
    }

    if let Some((_, body)) = blocks.first() {
        if let Ok(value) = serde_json::from_str::<Value>(body) {
            log::debug!("recovered JSON from untagged fence");
            return Ok(value);
        }
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&text[start..=end]) {
                log::debug!("recovered JSON from brace span");
                return Ok(value);
            }
        }
    }

    Err(CompareError::MalformedResponse(format!(
        "no JSON object found in response ({} chars)",
        raw.chars().count()
    )))
}

/// Fenced blocks in order of appearance as `(tag, body)`.
fn fenced_blocks(text: &str) -> Vec<(&str, &str)> {
    let mut blocks = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("```") {
        let after_open = &rest[open + 3..];
        let Some(close) = after_open.find("```") else {
            break;
        };
        let inner = &after_open[..close];
        let (tag, body) = match inner.find('\n') {
            Some(nl) => (inner[..nl].trim(), &inner[nl + 1..]),
            None => ("", inner),
        };
        blocks.push((tag, body.trim()));
        rest = &after_open[close + 3..];
    }

    blocks
}

/// Validate the shape of a recovered value.
///
/// The top level must be an object carrying `diffs` or `summary`. Items
/// missing a required string field, or with an unknown action, are dropped.
/// Unknown change types become `OTHER`.
pub fn parse_payload(value: Value) -> Result<DiffPayload, CompareError> {
    let obj = match value {
        Value::Object(obj) => obj,
        other => {
            return Err(CompareError::MalformedResponse(format!(
                "expected a JSON object, got {}",
                kind_of(&other)
            )))
        }
    };

    if !obj.contains_key("diffs") && !obj.contains_key("summary") {
        return Err(CompareError::MalformedResponse(
            "object has neither 'diffs' nor 'summary'".to_string(),
        ));
    }

    let raw_items = match obj.get("diffs") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => {
            return Err(CompareError::MalformedResponse(format!(
                "'diffs' must be an array, got {}",
                kind_of(other)
            )))
        }
    };

    let mut diffs = Vec::with_capacity(raw_items.len());
    let mut dropped = 0usize;
    for (idx, raw) in raw_items.iter().enumerate() {
        match parse_item(raw) {
            Ok(item) => diffs.push(item),
            Err(reason) => {
                dropped += 1;
                log::warn!("dropping diff item {}: {}", idx, reason);
            }
        }
    }
    if dropped > 0 {
        log::warn!("{} of {} diff items dropped", dropped, raw_items.len());
    }

    let summary = obj
        .get("summary")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| NO_SUMMARY.to_string());

    Ok(DiffPayload { diffs, summary })
}

/// Extract then validate.
pub fn normalize_completion(raw: &str) -> Result<DiffPayload, CompareError> {
    parse_payload(extract_json(raw)?)
}

fn parse_item(raw: &Value) -> Result<DiffItem, String> {
    let obj = raw
        .as_object()
        .ok_or_else(|| format!("expected object, got {}", kind_of(raw)))?;

    let type_name = required_str(obj, "type")?;
    let action_name = required_str(obj, "action")?;
    let target = required_str(obj, "target")?;
    let description = required_str(obj, "description")?;

    let change_type = ChangeType::parse(type_name).unwrap_or(ChangeType::Other);
    let action =
        ChangeAction::parse(action_name).ok_or_else(|| format!("unknown action '{}'", action_name))?;

    Ok(DiffItem::new(change_type, action, target, description)
        .with_values(optional_text(obj, "oldValue"), optional_text(obj, "newValue")))
}

fn required_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a str, String> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(format!("'{}' must be a string, got {}", key, kind_of(other))),
        None => Err(format!("missing '{}'", key)),
    }
}

// Scalars are kept as text; arrays, objects and null are ignored
fn optional_text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_json() {
        let value = extract_json(r#"  {"diffs": [], "summary": "ok"}  "#).unwrap();
        assert_eq!(value, json!({"diffs": [], "summary": "ok"}));
    }

    #[test]
    fn test_fenced_json_with_prose() {
        let raw = "Here is the result:\n```json\n{\"diffs\":[],\"summary\":\"ok\"}\n```";
        let payload = normalize_completion(raw).unwrap();
        assert!(payload.diffs.is_empty());
        assert_eq!(payload.summary, "ok");
    }

    #[test]
    fn test_fence_tag_is_case_insensitive() {
        let raw = "```JSON\n{\"summary\":\"upper\"}\n```";
        assert_eq!(extract_json(raw).unwrap()["summary"], "upper");
    }

    #[test]
    fn test_json_fence_preferred_over_earlier_untagged_fence() {
        let raw = "```\nnot json\n```\nthen\n```json\n{\"summary\":\"tagged\"}\n```";
        assert_eq!(extract_json(raw).unwrap()["summary"], "tagged");
    }

    #[test]
    fn test_untagged_fence() {
        let raw = "Result:\n```\n{\"summary\":\"plain\"}\n```\nDone.";
        assert_eq!(extract_json(raw).unwrap()["summary"], "plain");
    }

    #[test]
    fn test_brace_span_fallback() {
        let raw = "Sure! {\"summary\": \"inline\", \"diffs\": []} Hope this helps.";
        assert_eq!(extract_json(raw).unwrap()["summary"], "inline");
    }

    #[test]
    fn test_unrecoverable_text() {
        let err = extract_json("I could not compare these sheets.").unwrap_err();
        assert!(matches!(err, CompareError::MalformedResponse(_)));
        let err = extract_json("} backwards {").unwrap_err();
        assert!(matches!(err, CompareError::MalformedResponse(_)));
    }

    #[test]
    fn test_top_level_must_be_object() {
        assert!(matches!(
            parse_payload(json!([1, 2])),
            Err(CompareError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_payload(json!({"foo": 1})),
            Err(CompareError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_diffs_must_be_array() {
        let err = parse_payload(json!({"diffs": "none", "summary": "x"})).unwrap_err();
        assert!(err.to_string().contains("'diffs' must be an array"));
    }

    #[test]
    fn test_missing_pieces_default() {
        let payload = parse_payload(json!({"summary": "only summary"})).unwrap();
        assert!(payload.diffs.is_empty());

        let payload = parse_payload(json!({"diffs": []})).unwrap();
        assert_eq!(payload.summary, NO_SUMMARY);
    }

    #[test]
    fn test_item_validation() {
        let payload = parse_payload(json!({
            "diffs": [
                {"type": "column", "action": "modified", "target": "email", "description": "Length 50 to 100",
                 "oldValue": "VARCHAR(50)", "newValue": "VARCHAR(100)"},
                {"type": "SEQUENCE", "action": "ADDED", "target": "seq_users", "description": "New sequence"},
                {"type": "TABLE", "action": "RENAMED", "target": "t", "description": "renamed"},
                {"type": "TABLE", "action": "ADDED", "description": "no target"},
                "not an object",
                {"type": "COLUMN", "action": "MODIFIED", "target": "len", "description": "numeric",
                 "oldValue": 50, "newValue": true}
            ],
            "summary": "mixed"
        }))
        .unwrap();

        assert_eq!(payload.diffs.len(), 3);
        assert_eq!(payload.diffs[0].change_type, ChangeType::Column);
        assert_eq!(payload.diffs[0].action, ChangeAction::Modified);
        assert_eq!(payload.diffs[0].old_value.as_deref(), Some("VARCHAR(50)"));
        assert_eq!(payload.diffs[1].change_type, ChangeType::Other);
        assert_eq!(payload.diffs[2].old_value.as_deref(), Some("50"));
        assert_eq!(payload.diffs[2].new_value.as_deref(), Some("true"));
    }

    #[test]
    fn test_fenced_blocks_scan() {
        let blocks = fenced_blocks("a ```json\n{}\n``` b ```\n[]\n``` c ```unterminated");
        assert_eq!(blocks, vec![("json", "{}"), ("", "[]")]);
    }
}
