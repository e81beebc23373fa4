//! The search and listing details pipelines.

use airbnb_api::{BrowserClient, Query, Url};
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, warn};

use crate::config::ScraperConfig;
use crate::embedded::{extract_deferred_state, ExtractionError};
use crate::error::PipelineError;
use crate::params::{ListingParams, SearchParams};
use crate::payload::{listing_details_payload, search_payload};
use crate::policy::RobotsGate;
use crate::response::ToolResult;
use crate::schema::ProjectionSchemas;

/// One browser session plus the schemas and robots gate the pipelines share.
///
/// Operations may run concurrently on a shared `Scraper`; they share the
/// session cookie jar.
pub struct Scraper {
    client: BrowserClient,
    robots: RobotsGate,
    schemas: ProjectionSchemas,
}

impl Scraper {
    pub fn new(config: ScraperConfig) -> Result<Self, PipelineError> {
        let client = BrowserClient::with_config(config.client)?;
        let schemas = ProjectionSchemas::load()?;
        Ok(Self {
            client,
            robots: RobotsGate::new(config.ignore_robots_txt),
            schemas,
        })
    }

    /// Creates a scraper for a custom origin. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, PipelineError> {
        Self::new(ScraperConfig::default().with_base_url(base_url))
    }

    pub fn client(&self) -> &BrowserClient {
        &self.client
    }

    /// Loads robots.txt and warms the session. Failures are logged and
    /// never abort startup.
    pub async fn initialize(&self) {
        if self.robots.ignores_all() {
            info!("robots.txt checks disabled for this process");
        } else {
            self.robots.rules(&self.client).await;
        }
        match self.client.warm_up().await {
            Ok(status) if status.is_success() => {
                info!("Session warmed up with {} cookies", self.client.cookies().len())
            }
            Ok(status) => warn!("Session warm-up returned {}", status),
            Err(e) => warn!("Session warm-up failed: {}", e),
        }
    }

    /// Runs a search and returns `{searchUrl, searchResults, paginationInfo}`.
    pub async fn search(&self, params: &SearchParams) -> ToolResult {
        let query = match params.to_query() {
            Ok(query) => query,
            Err(e) => return failure(e, "searchUrl", None),
        };
        let url = query.to_url(self.client.base_url());
        info!("Searching {}", url);

        match self.run_search(&url, params.ignore_robots_text).await {
            Ok(payload) => success("searchUrl", &url, payload),
            Err(e) => failure(e, "searchUrl", Some(&url)),
        }
    }

    /// Fetches one listing and returns `{listingUrl, details}`.
    pub async fn listing_details(&self, params: &ListingParams) -> ToolResult {
        let query = match params.to_query() {
            Ok(query) => query,
            Err(e) => return failure(e, "listingUrl", None),
        };
        let url = query.to_url(self.client.base_url());
        info!("Fetching listing {}", url);

        match self.run_listing(&url, params.ignore_robots_text).await {
            Ok(details) => success("listingUrl", &url, json!({ "details": details })),
            Err(e) => failure(e, "listingUrl", Some(&url)),
        }
    }

    async fn run_search(&self, url: &Url, bypass_robots: bool) -> Result<Value, PipelineError> {
        let state = self.load_page(url, bypass_robots).await?;
        Ok(search_payload(
            &state,
            &self.schemas.search_result,
            self.client.base_url(),
        )?)
    }

    async fn run_listing(&self, url: &Url, bypass_robots: bool) -> Result<Value, PipelineError> {
        let state = self.load_page(url, bypass_robots).await?;
        Ok(listing_details_payload(&state, &self.schemas.listing_sections)?)
    }

    /// Policy check, warm-up, fetch and deferred-state extraction.
    async fn load_page(&self, url: &Url, bypass_robots: bool) -> Result<Value, PipelineError> {
        self.robots.check(&self.client, url, bypass_robots).await?;

        if let Err(e) = self.client.warm_up().await {
            warn!("Session warm-up failed, continuing: {}", e);
        }

        let resp = self.client.fetch(url, None).await?;
        if !resp.is_success() {
            return Err(ExtractionError::HttpStatus {
                status: resp.status.as_u16(),
            }
            .into());
        }
        debug!("Fetched {} ({} bytes)", resp.url, resp.body.len());
        Ok(extract_deferred_state(&resp.body)?)
    }
}

fn success(url_key: &str, url: &Url, payload: Value) -> ToolResult {
    let mut result = Map::new();
    result.insert(url_key.to_string(), json!(url.as_str()));
    if let Value::Object(fields) = payload {
        result.extend(fields);
    }
    ToolResult::success(&Value::Object(result))
}

fn failure(err: PipelineError, url_key: &str, url: Option<&Url>) -> ToolResult {
    let kind = err.kind();
    match url {
        Some(url) => error!("{} failed ({}): {}", url, kind, err),
        None => error!("Rejected request ({}): {}", kind, err),
    }
    let mut result = Map::new();
    result.insert("error".to_string(), json!(err.to_string()));
    result.insert("kind".to_string(), json!(kind.to_string()));
    if let Some(url) = url {
        result.insert(url_key.to_string(), json!(url.as_str()));
    }
    ToolResult::failure(&Value::Object(result))
}
