//! The result envelope both pipelines return.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One block of tool output. Only text blocks are produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

/// `{content: [{type: "text", text}], isError}`.
///
/// The text is the pretty-printed JSON payload, so a consumer that only
/// reads text still gets structured data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ContentBlock>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(payload: &Value) -> Self {
        Self::from_payload(payload, false)
    }

    pub fn failure(payload: &Value) -> Self {
        Self::from_payload(payload, true)
    }

    fn from_payload(payload: &Value, is_error: bool) -> Self {
        let text = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
        Self {
            content: vec![ContentBlock::Text { text }],
            is_error,
        }
    }

    /// Text of the first block.
    pub fn text(&self) -> Option<&str> {
        self.content.iter().map(|block| match block {
            ContentBlock::Text { text } => text.as_str(),
        }).next()
    }

    /// The first block parsed back into JSON.
    pub fn payload(&self) -> Option<Value> {
        self.text().and_then(|text| serde_json::from_str(text).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_to_the_envelope_shape() {
        let result = ToolResult::success(&json!({ "searchUrl": "u" }));
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["isError"], json!(false));
        assert_eq!(value["content"][0]["type"], json!("text"));
        let text = value["content"][0]["text"].as_str().unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(text).unwrap(),
            json!({ "searchUrl": "u" })
        );
    }

    #[test]
    fn failure_sets_the_flag() {
        let result = ToolResult::failure(&json!({ "error": "boom" }));
        assert!(result.is_error);
        assert_eq!(result.payload(), Some(json!({ "error": "boom" })));
    }

    #[test]
    fn envelope_round_trips() {
        let raw = r#"{"content":[{"type":"text","text":"{}"}],"isError":true}"#;
        let result: ToolResult = serde_json::from_str(raw).unwrap();
        assert!(result.is_error);
        assert_eq!(result.text(), Some("{}"));
    }
}
