//! Reshaping the projected page state into the objects the pipelines return.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Map, Value};
use tracing::debug;
use url::Url;

use crate::embedded::{client_data, descend, ExtractionError};
use crate::projector::{clean, project};
use crate::schema::Schema;

/// Search results, relative to the client data entry.
pub const SEARCH_RESULTS_POINTER: &str = "/data/presentation/staysSearch/results";

/// Detail page sections, relative to the client data entry.
pub const LISTING_SECTIONS_POINTER: &str =
    "/data/presentation/stayProductDetailPage/sections/sections";

/// Builds `{searchResults: [...], paginationInfo}` from the deferred state.
///
/// Every result gets an `id` (decoded from the relay id) and a `url` on
/// `base`, followed by the fields the schema keeps.
pub fn search_payload(state: &Value, schema: &Schema, base: &Url) -> Result<Value, ExtractionError> {
    let results = descend(client_data(state)?, SEARCH_RESULTS_POINTER)?;
    let raw = results
        .get("searchResults")
        .and_then(Value::as_array)
        .ok_or_else(|| ExtractionError::UnexpectedShape {
            pointer: format!("{}/searchResults", SEARCH_RESULTS_POINTER),
            expected: "an array",
        })?;

    let search_results: Vec<Value> = raw.iter().map(|item| search_entry(item, schema, base)).collect();
    debug!("Projected {} search results", search_results.len());

    let mut payload = Map::new();
    payload.insert("searchResults".to_string(), Value::Array(search_results));
    if let Some(pagination) = results.get("paginationInfo") {
        let mut pagination = pagination.clone();
        clean(&mut pagination);
        payload.insert("paginationInfo".to_string(), pagination);
    }
    Ok(Value::Object(payload))
}

fn search_entry(item: &Value, schema: &Schema, base: &Url) -> Value {
    let mut entry = Map::new();
    let relay_id = item
        .pointer("/demandStayListing/id")
        .and_then(Value::as_str);
    if let Some(relay_id) = relay_id {
        let id = decode_listing_id(relay_id).unwrap_or_else(|| relay_id.to_string());
        entry.insert("url".to_string(), json!(listing_url(base, &id)));
        entry.insert("id".to_string(), json!(id));
    }
    if let Value::Object(projected) = project(item, schema) {
        for (key, value) in projected {
            entry.entry(key).or_insert(value);
        }
    }
    Value::Object(entry)
}

/// Builds `[{id: sectionId, ...}]` for the allow-listed detail sections.
pub fn listing_details_payload(
    state: &Value,
    schemas: &BTreeMap<String, Schema>,
) -> Result<Value, ExtractionError> {
    let sections = descend(client_data(state)?, LISTING_SECTIONS_POINTER)?
        .as_array()
        .ok_or_else(|| ExtractionError::UnexpectedShape {
            pointer: LISTING_SECTIONS_POINTER.to_string(),
            expected: "an array",
        })?;

    let mut details = Vec::new();
    for section in sections {
        let Some(section_id) = section.get("sectionId").and_then(Value::as_str) else {
            continue;
        };
        let Some(schema) = schemas.get(section_id) else {
            continue;
        };
        let Some(body) = section.get("section").filter(|body| body.is_object()) else {
            continue;
        };
        let mut detail = Map::new();
        detail.insert("id".to_string(), json!(section_id));
        if let Value::Object(projected) = project(body, schema) {
            for (key, value) in projected {
                detail.entry(key).or_insert(value);
            }
        }
        details.push(Value::Object(detail));
    }
    debug!("Kept {} of {} listing sections", details.len(), sections.len());
    Ok(Value::Array(details))
}

/// Decodes a relay id such as base64(`DemandStayListing:12345`) to `12345`.
pub fn decode_listing_id(relay_id: &str) -> Option<String> {
    let bytes = STANDARD.decode(relay_id).ok()?;
    let decoded = String::from_utf8(bytes).ok()?;
    let (_, id) = decoded.split_once(':')?;
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// `{base}/rooms/{id}` without any query string.
pub fn listing_url(base: &Url, id: &str) -> String {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push("rooms").push(id);
    }
    url.to_string()
}
