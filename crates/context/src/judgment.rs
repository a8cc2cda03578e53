//! Tolerant extraction of structured judgments from model output
//!
//! Models wrap JSON in prose or code fences, emit strings where numbers belong
//! and occasionally return nothing usable. Nothing here fails: missing or
//! malformed fields fall back to neutral values.

use resumeforge_common::types::Verdict;
use serde_json::{Map, Value};

pub type JsonObject = Map<String, Value>;

/// Pull a JSON object out of free-form text.
///
/// Tries the whole (trimmed) text first, then the span from the first `{` to
/// the last `}`. Anything that is not an object yields an empty map.
pub fn extract_json_object(text: &str) -> JsonObject {
    let text = text.trim();
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
        return map;
    }

    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return JsonObject::new();
    };
    if end < start {
        return JsonObject::new();
    }

    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(map)) => map,
        _ => JsonObject::new(),
    }
}

/// Verdict field; `default` when absent, `Revise` for any non-string value
pub fn verdict_field(map: &JsonObject, key: &str, default: Verdict) -> Verdict {
    match map.get(key) {
        None => default,
        Some(Value::String(raw)) => Verdict::coerce(raw),
        Some(_) => Verdict::Revise,
    }
}

/// Score field clamped into `[0, 10]`
pub fn score_field(map: &JsonObject, key: &str) -> f64 {
    let raw = match map.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match raw {
        Some(value) if value.is_finite() => value.clamp(0.0, 10.0),
        _ => 0.0,
    }
}

/// List field; only arrays count, blank items are dropped
pub fn string_list_field(map: &JsonObject, key: &str) -> Vec<String> {
    match map.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(stringify)
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Text field, trimmed; missing or null is empty
pub fn string_field(map: &JsonObject, key: &str) -> String {
    map.get(key).map(stringify).unwrap_or_default().trim().to_string()
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_extract_plain_object() {
        let map = extract_json_object(r#"  {"decision": "accept", "score": 9}  "#);
        assert_eq!(map.get("score"), Some(&json!(9)));
    }

    #[test]
    fn test_extract_from_fenced_prose() {
        let text = "Here you go:\n```json\n{\"decision\": \"revise\", \"edits\": [\"a\"]}\n```\nThanks!";
        let map = extract_json_object(text);
        assert_eq!(map.get("decision"), Some(&json!("revise")));
    }

    #[test]
    fn test_extract_garbage_is_empty() {
        assert!(extract_json_object("no json here").is_empty());
        assert!(extract_json_object("} backwards {").is_empty());
        assert!(extract_json_object("{ not: valid json }").is_empty());
        assert!(extract_json_object("").is_empty());
    }

    #[test]
    fn test_extract_non_object_is_empty() {
        assert!(extract_json_object("[1, 2, 3]").is_empty());
        assert!(extract_json_object("42").is_empty());
        assert!(extract_json_object("\"accept\"").is_empty());
    }

    #[test]
    fn test_verdict_field() {
        let map = object(json!({"a": " Accept ", "b": "maybe", "c": true, "d": null}));
        assert_eq!(verdict_field(&map, "a", Verdict::Revise), Verdict::Accept);
        assert_eq!(verdict_field(&map, "b", Verdict::Accept), Verdict::Revise);
        assert_eq!(verdict_field(&map, "c", Verdict::Accept), Verdict::Revise);
        assert_eq!(verdict_field(&map, "d", Verdict::Accept), Verdict::Revise);
        assert_eq!(verdict_field(&map, "missing", Verdict::Accept), Verdict::Accept);
    }

    #[test]
    fn test_score_field_clamps_and_coerces() {
        let map = object(json!({
            "high": 15,
            "low": -3,
            "text": "abc",
            "numeric_text": " 7.5 ",
            "flag": true,
            "null": null,
            "inf": "inf",
            "nan": "NaN",
        }));
        assert_eq!(score_field(&map, "high"), 10.0);
        assert_eq!(score_field(&map, "low"), 0.0);
        assert_eq!(score_field(&map, "text"), 0.0);
        assert_eq!(score_field(&map, "numeric_text"), 7.5);
        assert_eq!(score_field(&map, "flag"), 0.0);
        assert_eq!(score_field(&map, "null"), 0.0);
        assert_eq!(score_field(&map, "inf"), 0.0);
        assert_eq!(score_field(&map, "nan"), 0.0);
        assert_eq!(score_field(&map, "missing"), 0.0);
    }

    #[test]
    fn test_string_list_field() {
        let map = object(json!({
            "mixed": ["  keep ", "", "   ", 3, {"k": "v"}, null],
            "scalar": "not a list",
        }));
        assert_eq!(
            string_list_field(&map, "mixed"),
            vec!["keep".to_string(), "3".to_string(), "{\"k\":\"v\"}".to_string()]
        );
        assert!(string_list_field(&map, "scalar").is_empty());
        assert!(string_list_field(&map, "missing").is_empty());
    }

    #[test]
    fn test_string_field() {
        let map = object(json!({"s": "  tight  ", "n": 4.5, "null": null}));
        assert_eq!(string_field(&map, "s"), "tight");
        assert_eq!(string_field(&map, "n"), "4.5");
        assert_eq!(string_field(&map, "null"), "");
        assert_eq!(string_field(&map, "missing"), "");
    }
}
