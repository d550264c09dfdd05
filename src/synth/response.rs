//! Model response payloads and their normalization to plain text.
//!
//! The service may answer with an aggregated `output_text`, with a list of
//! output items carrying text fragments, or both. [`ResponseShape`] names the
//! two forms and [`ExtractedText`] is the single result the controller uses.

use crate::synth::error::{SynthesisError, SynthesisResult};
use serde::{Deserialize, Serialize};

/// Wire form of a responses-API reply. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsesPayload {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Vec<OutputItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputItem {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<ContentFragment>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFragment {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// The two ways a reply can carry text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseShape {
    Aggregated(String),
    Items(Vec<OutputItem>),
}

impl From<ResponsesPayload> for ResponseShape {
    fn from(payload: ResponsesPayload) -> Self {
        match payload.output_text {
            Some(text) if !text.trim().is_empty() => ResponseShape::Aggregated(text),
            _ => ResponseShape::Items(payload.output.unwrap_or_default()),
        }
    }
}

/// Trimmed, non-empty reply text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<ResponseShape> for ExtractedText {
    type Error = SynthesisError;

    fn try_from(shape: ResponseShape) -> SynthesisResult<Self> {
        let text = match shape {
            ResponseShape::Aggregated(text) => text.trim().to_string(),
            ResponseShape::Items(items) => {
                let mut fragments: Vec<&str> = Vec::new();
                for item in &items {
                    if let Some(text) = item.text.as_deref().filter(|t| !t.is_empty()) {
                        fragments.push(text);
                    }
                    for fragment in item.content.iter().flatten() {
                        if let Some(text) = fragment.text.as_deref().filter(|t| !t.is_empty()) {
                            fragments.push(text);
                        }
                    }
                }
                fragments.join("\n").trim().to_string()
            }
        };

        if text.is_empty() {
            return Err(SynthesisError::NoTextualOutput);
        }
        Ok(ExtractedText(text))
    }
}

impl TryFrom<ResponsesPayload> for ExtractedText {
    type Error = SynthesisError;

    fn try_from(payload: ResponsesPayload) -> SynthesisResult<Self> {
        ExtractedText::try_from(ResponseShape::from(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ResponsesPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn aggregated_text_wins_and_is_trimmed() {
        let payload = parse(
            r#"{"id":"r1","status":"completed","output_text":"  hello \n",
                "output":[{"type":"message","text":"ignored"}]}"#,
        );
        let text = ExtractedText::try_from(payload).unwrap();
        assert_eq!(text.as_str(), "hello");
    }

    #[test]
    fn blank_aggregate_falls_back_to_items() {
        let payload = parse(
            r#"{"id":"r1","status":"completed","output_text":"   ",
                "output":[
                  {"type":"reasoning"},
                  {"type":"message","text":"first","content":[
                    {"type":"output_text","text":"second"},
                    {"type":"refusal","text":null}
                  ]}
                ]}"#,
        );
        assert!(matches!(
            ResponseShape::from(payload.clone()),
            ResponseShape::Items(ref items) if items.len() == 2
        ));
        assert_eq!(ExtractedText::try_from(payload).unwrap().as_str(), "first\nsecond");
    }

    #[test]
    fn nested_fragment_only() {
        let payload = parse(
            r#"{"id":"r1","status":"completed","output":[
                {"type":"message","content":[{"type":"output_text","text":"```dot\ndigraph G {}\n```"}]}
            ]}"#,
        );
        assert_eq!(
            ExtractedText::try_from(payload).unwrap().into_string(),
            "```dot\ndigraph G {}\n```"
        );
    }

    #[test]
    fn no_text_anywhere_is_an_error() {
        let payload = parse(r#"{"id":"r1","status":"completed","output":[{"type":"reasoning"}]}"#);
        assert!(matches!(ExtractedText::try_from(payload), Err(SynthesisError::NoTextualOutput)));

        let payload = parse(r#"{"id":"r2","status":"incomplete"}"#);
        assert!(matches!(ExtractedText::try_from(payload), Err(SynthesisError::NoTextualOutput)));
    }
}
