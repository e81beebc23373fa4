//! Extraction layer for the listing site: robots gate, page-state
//! extraction, schema projection and the two pipelines built on them.
//!
//! Wraps the `airbnb_api` browser client. Every operation returns a
//! [`ToolResult`] envelope; failures are reported in it rather than
//! propagated.

pub mod config;
pub mod embedded;
pub mod error;
pub mod params;
pub mod payload;
pub mod pipeline;
pub mod policy;
pub mod projector;
pub mod response;
pub mod schema;

pub use airbnb_api;
pub use airbnb_api::{BrowserClient, ClientConfig, RequestPacing, RobotsRuleSet};

pub use config::ScraperConfig;
pub use embedded::ExtractionError;
pub use error::{ErrorKind, PipelineError};
pub use params::{Count, ListingParams, SearchParams};
pub use pipeline::Scraper;
pub use policy::RobotsGate;
pub use projector::{clean, flatten_arrays_in_object, pick_by_schema};
pub use response::{ContentBlock, ToolResult};
pub use schema::{ProjectionSchemas, Schema, SchemaError, SchemaRule};
