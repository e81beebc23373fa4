use anyhow::{bail, Result};
use airbnb_lib::ToolResult;
use serde_json::Value;
use tabled::{Table, Tabled};

const SUMMARY_WIDTH: usize = 80;

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
    /// The raw `{content, isError}` result.
    Envelope,
}

#[derive(Tabled)]
struct SearchRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Rating")]
    rating: String,
    #[tabled(rename = "URL")]
    url: String,
}

#[derive(Tabled)]
struct SectionRow {
    #[tabled(rename = "Section")]
    section: String,
    #[tabled(rename = "Summary")]
    summary: String,
}

/// Parses the result payload, turning an error result into an `Err`.
pub fn ensure_success(result: &ToolResult) -> Result<Value> {
    let Some(payload) = result.payload() else {
        bail!("result carried no JSON payload");
    };
    if result.is_error {
        let message = payload["error"].as_str().unwrap_or("unknown error");
        bail!("{}", message);
    }
    Ok(payload)
}

// -- Row builders --

fn text_at(value: &Value, pointer: &str) -> String {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn build_search_rows(payload: &Value) -> Vec<SearchRow> {
    let Some(results) = payload["searchResults"].as_array() else {
        return Vec::new();
    };
    results
        .iter()
        .map(|r| {
            let mut name = text_at(
                r,
                "/demandStayListing/description/name/localizedStringWithTranslationPreference",
            );
            if name.is_empty() {
                name = text_at(r, "/title");
            }
            SearchRow {
                id: text_at(r, "/id"),
                name,
                price: text_at(r, "/structuredDisplayPrice/primaryLine/accessibilityLabel"),
                rating: text_at(r, "/avgRatingA11yLabel"),
                url: text_at(r, "/url"),
            }
        })
        .collect()
}

fn build_section_rows(payload: &Value) -> Vec<SectionRow> {
    let Some(details) = payload["details"].as_array() else {
        return Vec::new();
    };
    details
        .iter()
        .map(|d| SectionRow {
            section: text_at(d, "/id"),
            summary: summarize(d),
        })
        .collect()
}

/// Joins the section's text leaves, markup stripped, cut to one line.
fn summarize(section: &Value) -> String {
    let mut parts = Vec::new();
    collect_text(section, &mut parts);
    truncate(&parts.join("; "), SUMMARY_WIDTH)
}

fn collect_text(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            let text = strip_tags(s);
            if !text.is_empty() {
                out.push(text);
            }
        }
        Value::Number(n) => out.push(n.to_string()),
        Value::Array(items) => items.iter().for_each(|item| collect_text(item, out)),
        Value::Object(map) => {
            for (key, child) in map {
                if key != "id" {
                    collect_text(child, out);
                }
            }
        }
        _ => {}
    }
}

fn strip_tags(input: &str) -> String {
    let mut text = String::with_capacity(input.len());
    let mut in_tag = false;
    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    let cut: String = input.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", cut)
}

// -- Table output --

pub fn print_search_table(payload: &Value) {
    println!("{}", Table::new(build_search_rows(payload)));
}

pub fn print_listing_table(payload: &Value) {
    println!("{}", Table::new(build_section_rows(payload)));
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}
