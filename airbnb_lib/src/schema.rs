//! Allow-list schemas for projecting the embedded page state.
//!
//! A schema maps key names to either [`SchemaRule::Keep`] (keep the value
//! verbatim) or a nested schema. The literals live in
//! `seed_data/projection_schemas.yml` and are embedded at compile time.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Error types for schema loading.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to parse projection schema YAML: {0}")]
    YamlParse(#[from] serde_yml::Error),
    #[error("Projection schema is empty: {0}")]
    Empty(String),
}

/// What to do with the value found under a schema key.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaRule {
    Keep,
    Nested(Schema),
}

/// Strict allow-list: keys absent from the schema are dropped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema(BTreeMap<String, SchemaRule>);

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key whose value is kept verbatim.
    pub fn keep(mut self, key: &str) -> Self {
        self.0.insert(key.to_string(), SchemaRule::Keep);
        self
    }

    /// Adds a key whose value is projected through `nested`.
    pub fn nested(mut self, key: &str, nested: Schema) -> Self {
        self.0.insert(key.to_string(), SchemaRule::Nested(nested));
        self
    }

    pub fn get(&self, key: &str) -> Option<&SchemaRule> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SchemaRule)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// YAML shape: `true`/`false` leaves or nested mappings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawRule {
    Flag(bool),
    Nested(BTreeMap<String, RawRule>),
}

fn from_raw(raw: BTreeMap<String, RawRule>) -> Schema {
    let mut schema = Schema::new();
    for (key, rule) in raw {
        match rule {
            RawRule::Flag(true) => {
                schema.0.insert(key, SchemaRule::Keep);
            }
            // `false` is the same as leaving the key out.
            RawRule::Flag(false) => {}
            RawRule::Nested(nested) => {
                schema.0.insert(key, SchemaRule::Nested(from_raw(nested)));
            }
        }
    }
    schema
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        BTreeMap::<String, RawRule>::deserialize(deserializer).map(from_raw)
    }
}

/// The schemas used by the two extraction pipelines.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectionSchemas {
    /// Applied to each entry of the search results list.
    pub search_result: Schema,
    /// Keyed by section id; sections without an entry are dropped.
    pub listing_sections: BTreeMap<String, Schema>,
}

impl ProjectionSchemas {
    /// Parses and checks schemas from YAML content.
    pub fn parse(yaml_content: &str) -> Result<Self, SchemaError> {
        let schemas: ProjectionSchemas = serde_yml::from_str(yaml_content)?;
        if schemas.search_result.is_empty() {
            return Err(SchemaError::Empty("search_result".into()));
        }
        if schemas.listing_sections.is_empty() {
            return Err(SchemaError::Empty("listing_sections".into()));
        }
        for (section_id, schema) in &schemas.listing_sections {
            if schema.is_empty() {
                return Err(SchemaError::Empty(format!("listing_sections.{}", section_id)));
            }
        }
        Ok(schemas)
    }

    /// Loads the schemas embedded at compile time.
    pub fn load() -> Result<Self, SchemaError> {
        let yaml_content = include_str!("../../seed_data/projection_schemas.yml");
        Self::parse(yaml_content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_schemas_load() {
        let schemas = ProjectionSchemas::load().unwrap();
        assert!(schemas.search_result.get("demandStayListing").is_some());
        assert_eq!(
            schemas.search_result.get("avgRatingA11yLabel"),
            Some(&SchemaRule::Keep)
        );
        let ids: Vec<&str> = schemas.listing_sections.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "AMENITIES_DEFAULT",
                "DESCRIPTION_DEFAULT",
                "HIGHLIGHTS_DEFAULT",
                "LOCATION_DEFAULT",
                "POLICIES_DEFAULT",
            ]
        );
    }

    #[test]
    fn nested_rules_parse() {
        let yaml = r#"
search_result:
  price:
    items:
      label: true
listing_sections:
  LOCATION_DEFAULT:
    lat: true
"#;
        let schemas = ProjectionSchemas::parse(yaml).unwrap();
        let expected = Schema::new().nested(
            "price",
            Schema::new().nested("items", Schema::new().keep("label")),
        );
        assert_eq!(schemas.search_result, expected);
    }

    #[test]
    fn false_entries_are_dropped() {
        let yaml = r#"
search_result:
  id: true
  debug: false
listing_sections:
  LOCATION_DEFAULT:
    lat: true
"#;
        let schemas = ProjectionSchemas::parse(yaml).unwrap();
        assert_eq!(schemas.search_result.len(), 1);
        assert!(schemas.search_result.get("debug").is_none());
    }

    #[test]
    fn empty_schema_is_rejected() {
        let yaml = "search_result: {}\nlisting_sections:\n  X:\n    a: true\n";
        assert!(matches!(
            ProjectionSchemas::parse(yaml),
            Err(SchemaError::Empty(_))
        ));
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        let yaml = "search_result: [1, 2\n";
        assert!(matches!(
            ProjectionSchemas::parse(yaml),
            Err(SchemaError::YamlParse(_))
        ));
    }
}
