//! robots.txt gate in front of every pipeline fetch.

use airbnb_api::{BrowserClient, RobotsRuleSet, Url};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::error::PipelineError;

/// Lazily loaded robots.txt rules for the session origin.
///
/// The rules are fetched at most once per gate. Any failure to obtain them
/// leaves an empty, permissive rule set in place.
pub struct RobotsGate {
    rules: OnceCell<RobotsRuleSet>,
    ignore_all: bool,
}

impl RobotsGate {
    /// `ignore_all` skips the check for every call.
    pub fn new(ignore_all: bool) -> Self {
        Self {
            rules: OnceCell::new(),
            ignore_all,
        }
    }

    /// Gate with fixed rules; nothing is fetched.
    pub fn with_rules(rules: RobotsRuleSet, ignore_all: bool) -> Self {
        Self {
            rules: OnceCell::new_with(Some(rules)),
            ignore_all,
        }
    }

    pub fn ignores_all(&self) -> bool {
        self.ignore_all
    }

    /// Returns the rule set, fetching it on first use.
    pub async fn rules(&self, client: &BrowserClient) -> &RobotsRuleSet {
        self.rules
            .get_or_init(|| async {
                match client.fetch_robots_txt().await {
                    Ok(Some(body)) => {
                        let rules = RobotsRuleSet::parse(&body);
                        info!("Loaded robots.txt with {} rules", rules.rule_count());
                        rules
                    }
                    Ok(None) => {
                        warn!("robots.txt unavailable; treating every path as allowed");
                        RobotsRuleSet::default()
                    }
                    Err(e) => {
                        warn!("Failed to fetch robots.txt: {}; treating every path as allowed", e);
                        RobotsRuleSet::default()
                    }
                }
            })
            .await
    }

    /// Fails with [`PipelineError::PolicyViolation`] when robots.txt denies
    /// `url` for the session user agent. `bypass` skips the check for this
    /// call only.
    pub async fn check(
        &self,
        client: &BrowserClient,
        url: &Url,
        bypass: bool,
    ) -> Result<(), PipelineError> {
        let path = path_and_query(url);
        if self.ignore_all || bypass {
            debug!("Skipping robots.txt check for {}", path);
            return Ok(());
        }
        let rules = self.rules(client).await;
        if rules.is_allowed(&path, client.user_agent()) {
            return Ok(());
        }
        warn!("robots.txt disallows {}", path);
        Err(PipelineError::PolicyViolation { path })
    }
}

/// `/path?query` as matched against robots.txt rules.
pub fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}
