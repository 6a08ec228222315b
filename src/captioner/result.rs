//! Decoding of the captioning service's JSON reply.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

/// Captions returned by the service.
///
/// Keys are matched ignoring case and `_`, so `caption_conditional`,
/// `CaptionConditional` and `captionConditional` all land in the same
/// field. Keys we don't know are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct CaptionResult {
    pub caption: Option<String>,
    pub caption_conditional: Option<String>,
    pub caption_unconditional: Option<String>,
    pub extra: BTreeMap<String, Value>,
}

impl CaptionResult {
    /// Decode a response body. A bare `null` decodes to an empty result.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        let result: Option<CaptionResult> = serde_json::from_str(body)?;
        Ok(result.unwrap_or_default())
    }

    /// Labelled caption texts in display order. Null fields are skipped;
    /// extra fields are included only when they hold a string.
    pub fn lines(&self) -> Vec<(String, String)> {
        let known = [
            ("Conditional caption", &self.caption_conditional),
            ("Unconditional caption", &self.caption_unconditional),
            ("Caption", &self.caption),
        ];

        let mut lines: Vec<(String, String)> = known
            .into_iter()
            .filter_map(|(label, text)| text.as_ref().map(|t| (label.to_string(), t.clone())))
            .collect();

        lines.extend(
            self.extra
                .iter()
                .filter_map(|(key, value)| value.as_str().map(|s| (key.clone(), s.to_string()))),
        );
        lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }
}

impl TryFrom<Map<String, Value>> for CaptionResult {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut result = CaptionResult::default();

        for (key, value) in map {
            let slot = match normalize_key(&key).as_str() {
                "caption" => &mut result.caption,
                "captionconditional" => &mut result.caption_conditional,
                "captionunconditional" => &mut result.caption_unconditional,
                _ => {
                    result.extra.insert(key, value);
                    continue;
                }
            };
            *slot = match value {
                Value::Null => None,
                Value::String(text) => Some(text),
                other => {
                    return Err(format!(
                        "field `{key}` must be a string or null, found {}",
                        json_type_name(&other)
                    ))
                }
            };
        }
        Ok(result)
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
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

    #[test]
    fn test_plain_caption() {
        let result = CaptionResult::from_json(r#"{"caption": "a dog"}"#).unwrap();
        assert_eq!(result.caption.as_deref(), Some("a dog"));
        assert!(result.extra.is_empty());
    }

    #[test]
    fn test_snake_case_service_fields() {
        let body = r#"{
            "caption_conditional": "a photography of a dog on a beach",
            "caption_unconditional": "a dog running"
        }"#;
        let result = CaptionResult::from_json(body).unwrap();
        assert_eq!(
            result.caption_conditional.as_deref(),
            Some("a photography of a dog on a beach")
        );
        assert_eq!(result.caption_unconditional.as_deref(), Some("a dog running"));
        assert_eq!(result.caption, None);
    }

    #[test]
    fn test_keys_match_case_insensitively() {
        let body = r#"{"CaptionConditional": "x", "CAPTION_UNCONDITIONAL": "y", "Caption": "z"}"#;
        let result = CaptionResult::from_json(body).unwrap();
        assert_eq!(result.caption_conditional.as_deref(), Some("x"));
        assert_eq!(result.caption_unconditional.as_deref(), Some("y"));
        assert_eq!(result.caption.as_deref(), Some("z"));
    }

    #[test]
    fn test_null_captions_allowed() {
        // The service answers with nulls when its model fails on an image
        let body = r#"{"caption_conditional": null, "caption_unconditional": null}"#;
        let result = CaptionResult::from_json(body).unwrap();
        assert_eq!(result, CaptionResult::default());
        assert!(result.is_empty());
    }

    #[test]
    fn test_null_body_is_empty_result() {
        let result = CaptionResult::from_json("null").unwrap();
        assert_eq!(result, CaptionResult::default());
        assert!(result.is_empty());
    }

    #[test]
    fn test_unknown_fields_kept() {
        let body = r#"{"caption": "a cat", "model": "blip", "latency_ms": 12}"#;
        let result = CaptionResult::from_json(body).unwrap();
        assert_eq!(result.extra.len(), 2);
        assert_eq!(result.extra["model"], Value::from("blip"));

        let lines = result.lines();
        assert_eq!(
            lines,
            vec![
                ("Caption".to_string(), "a cat".to_string()),
                ("model".to_string(), "blip".to_string()),
            ]
        );
    }

    #[test]
    fn test_lines_order() {
        let body = r#"{"caption": "c", "caption_unconditional": "u", "caption_conditional": "k"}"#;
        let labels: Vec<String> = CaptionResult::from_json(body)
            .unwrap()
            .lines()
            .into_iter()
            .map(|(label, _)| label)
            .collect();
        assert_eq!(
            labels,
            vec!["Conditional caption", "Unconditional caption", "Caption"]
        );
    }

    #[test]
    fn test_wrong_field_type_rejected() {
        let err = CaptionResult::from_json(r#"{"caption": 42}"#).unwrap_err();
        assert!(err.to_string().contains("must be a string or null"));
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(CaptionResult::from_json(r#"["a dog"]"#).is_err());
        assert!(CaptionResult::from_json("not json").is_err());
        assert!(CaptionResult::from_json("").is_err());
    }
}
