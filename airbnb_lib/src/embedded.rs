//! Locating the JSON state the site embeds in its server-rendered pages.

use scraper::{Html, Selector};
use serde_json::Value;
use thiserror::Error;

/// The script element holding the deferred page state.
pub const DEFERRED_STATE_SELECTOR: &str = "script#data-deferred-state-0";

/// Where the GraphQL client cache sits inside the deferred state.
pub const CLIENT_DATA_POINTER: &str = "/niobeMinimalClientData/0/1";

/// Failures while turning a fetched page into a JSON subtree.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Page has no element matching `{selector}`")]
    MissingScript { selector: String },
    #[error("Invalid selector: {0}")]
    Selector(String),
    #[error("Embedded state is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Embedded state has no value at `{pointer}`")]
    MissingSubtree { pointer: String },
    #[error("Expected {expected} at `{pointer}`")]
    UnexpectedShape {
        pointer: String,
        expected: &'static str,
    },
    #[error("Page returned HTTP status {status}")]
    HttpStatus { status: u16 },
}

/// Parses `html` and returns the JSON text of the deferred-state script.
pub fn extract_deferred_state(html: &str) -> Result<Value, ExtractionError> {
    let selector = Selector::parse(DEFERRED_STATE_SELECTOR)
        .map_err(|e| ExtractionError::Selector(format!("{:?}", e)))?;
    let document = Html::parse_document(html);
    let script = document
        .select(&selector)
        .next()
        .ok_or_else(|| ExtractionError::MissingScript {
            selector: DEFERRED_STATE_SELECTOR.to_string(),
        })?;
    let json_text = script.text().collect::<String>();
    Ok(serde_json::from_str(json_text.trim())?)
}

/// The client cache entry every page-level pointer is relative to.
pub fn client_data(state: &Value) -> Result<&Value, ExtractionError> {
    descend(state, CLIENT_DATA_POINTER)
}

/// JSON-pointer lookup that reports the missing path.
pub fn descend<'a>(value: &'a Value, pointer: &str) -> Result<&'a Value, ExtractionError> {
    value
        .pointer(pointer)
        .ok_or_else(|| ExtractionError::MissingSubtree {
            pointer: pointer.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(script: &str) -> String {
        format!(
            "<!doctype html><html><head><title>t</title></head><body>\
             <div id=\"root\"></div>{}</body></html>",
            script
        )
    }

    #[test]
    fn finds_the_deferred_state_script() {
        let html = page(
            r#"<script id="data-deferred-state-0" data-deferred-state-0="true" type="application/json">
            {"niobeMinimalClientData":[["StaysSearch:{}",{"data":{"ok":true}}]]}
            </script>"#,
        );
        let state = extract_deferred_state(&html).unwrap();
        let data = client_data(&state).unwrap();
        assert_eq!(data, &json!({ "data": { "ok": true } }));
    }

    #[test]
    fn ignores_other_scripts() {
        let html = page(
            r#"<script id="data-deferred-state-1" type="application/json">{"x":1}</script>
            <script id="data-deferred-state-0" type="application/json">{"y":2}</script>"#,
        );
        assert_eq!(extract_deferred_state(&html).unwrap(), json!({ "y": 2 }));
    }

    #[test]
    fn missing_script_is_reported() {
        let html = page("<script>var x = 1;</script>");
        assert!(matches!(
            extract_deferred_state(&html),
            Err(ExtractionError::MissingScript { .. })
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        let html = page(r#"<script id="data-deferred-state-0">{"broken": </script>"#);
        assert!(matches!(
            extract_deferred_state(&html),
            Err(ExtractionError::Json(_))
        ));
    }

    #[test]
    fn descend_names_the_missing_pointer() {
        let err = descend(&json!({ "a": {} }), "/a/b").unwrap_err();
        assert_eq!(err.to_string(), "Embedded state has no value at `/a/b`");
    }

    #[test]
    fn client_data_requires_the_cache_entry() {
        let state = json!({ "niobeMinimalClientData": [] });
        assert!(matches!(
            client_data(&state),
            Err(ExtractionError::MissingSubtree { .. })
        ));
    }
}
