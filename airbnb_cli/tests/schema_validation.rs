use airbnb_lib::airbnb_api::Url;
use airbnb_lib::embedded::extract_deferred_state;
use airbnb_lib::payload::{listing_details_payload, search_payload};
use airbnb_lib::{ProjectionSchemas, Scraper, SearchParams};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("CLI crate should be inside workspace")
        .to_path_buf()
}

fn load_page_state(name: &str) -> Value {
    let path = workspace_root().join("airbnb_lib/tests/fixtures").join(name);
    let html = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("read fixture {}: {}", path.display(), e));
    extract_deferred_state(&html).expect("fixture embeds page state")
}

fn load_schema(name: &str) -> Value {
    let path = workspace_root().join("schema").join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("read schema {}: {}", path.display(), e));
    serde_json::from_str(&text).expect("schema is valid JSON")
}

fn search_fixture_payload() -> Value {
    let schemas = ProjectionSchemas::load().unwrap();
    let base = Url::parse("https://www.airbnb.com").unwrap();
    let mut payload = search_payload(
        &load_page_state("search_page.html"),
        &schemas.search_result,
        &base,
    )
    .unwrap();
    payload["searchUrl"] =
        json!("https://www.airbnb.com/s/Paris/homes?adults=1&children=0&infants=0&pets=0");
    payload
}

fn listing_fixture_payload() -> Value {
    let schemas = ProjectionSchemas::load().unwrap();
    let details = listing_details_payload(
        &load_page_state("listing_page.html"),
        &schemas.listing_sections,
    )
    .unwrap();
    json!({
        "listingUrl": "https://www.airbnb.com/rooms/12345678",
        "details": details
    })
}

// ---------------------------------------------------------------------------
// Positive validation: payloads conform to their schemas
// ---------------------------------------------------------------------------

#[test]
fn test_search_payload_conforms_to_schema() {
    let schema = load_schema("search_response.schema.json");
    let data = search_fixture_payload();

    let validator = jsonschema::draft202012::new(&schema).expect("search schema compiles");
    let result = validator.validate(&data);
    if let Err(e) = &result {
        panic!("search payload failed validation: {e}");
    }
}

#[test]
fn test_listing_payload_conforms_to_schema() {
    let schema = load_schema("listing_response.schema.json");
    let data = listing_fixture_payload();

    let validator = jsonschema::draft202012::new(&schema).expect("listing schema compiles");
    let result = validator.validate(&data);
    if let Err(e) = &result {
        panic!("listing payload failed validation: {e}");
    }
}

#[tokio::test]
async fn test_error_payload_conforms_to_schema() {
    let schema = load_schema("error_response.schema.json");
    let scraper = Scraper::with_base_url("http://127.0.0.1:1").unwrap();
    let result = scraper.search(&SearchParams::default()).await;
    assert!(result.is_error);
    let data = result.payload().unwrap();

    let validator = jsonschema::draft202012::new(&schema).expect("error schema compiles");
    let result = validator.validate(&data);
    if let Err(e) = &result {
        panic!("error payload failed validation: {e}");
    }
}

#[tokio::test]
async fn test_transport_error_payload_conforms_to_schema() {
    let schema = load_schema("error_response.schema.json");
    let scraper = Scraper::with_base_url("http://127.0.0.1:1").unwrap();
    let result = scraper.search(&SearchParams::new("Paris")).await;
    assert!(result.is_error);
    let data = result.payload().unwrap();
    assert_eq!(data["kind"], json!("transport_failure"));
    assert!(data["searchUrl"].is_string());

    let validator = jsonschema::draft202012::new(&schema).expect("error schema compiles");
    let result = validator.validate(&data);
    if let Err(e) = &result {
        panic!("transport error payload failed validation: {e}");
    }
}

// ---------------------------------------------------------------------------
// Negative validation: schemas reject invalid data
// ---------------------------------------------------------------------------

#[test]
fn test_search_schema_rejects_leaked_field() {
    let schema = load_schema("search_response.schema.json");
    let mut data = search_fixture_payload();
    data["searchResults"][0]["contextualPictures"] = json!([{ "picture": "x.jpg" }]);

    let validator = jsonschema::draft202012::new(&schema).expect("search schema compiles");
    assert!(!validator.is_valid(&data));
}

#[test]
fn test_search_schema_rejects_missing_url() {
    let schema = load_schema("search_response.schema.json");
    let mut data = search_fixture_payload();
    data["searchResults"][0]
        .as_object_mut()
        .unwrap()
        .remove("url");

    let validator = jsonschema::draft202012::new(&schema).expect("search schema compiles");
    assert!(!validator.is_valid(&data));
}

#[test]
fn test_listing_schema_rejects_unknown_section() {
    let schema = load_schema("listing_response.schema.json");
    let mut data = listing_fixture_payload();
    data["details"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "id": "REVIEWS_DEFAULT", "title": "Reviews" }));

    let validator = jsonschema::draft202012::new(&schema).expect("listing schema compiles");
    assert!(!validator.is_valid(&data));
}

#[test]
fn test_error_schema_rejects_unknown_kind() {
    let schema = load_schema("error_response.schema.json");
    let data = json!({ "error": "boom", "kind": "timeout" });

    let validator = jsonschema::draft202012::new(&schema).expect("error schema compiles");
    assert!(!validator.is_valid(&data));
}
