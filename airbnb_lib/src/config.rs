//! Process-level settings for the scraper.

use airbnb_api::ClientConfig;

/// Settings shared by every pipeline run of one [`crate::Scraper`].
#[derive(Debug, Clone, Default)]
pub struct ScraperConfig {
    pub client: ClientConfig,
    /// Skip the robots.txt check for every call, not just flagged ones.
    pub ignore_robots_txt: bool,
}

impl ScraperConfig {
    /// Reads `AIRBNB_*` environment variables; see [`ClientConfig::from_env`].
    pub fn from_env() -> Self {
        Self {
            client: ClientConfig::from_env(),
            ignore_robots_txt: env_bool("AIRBNB_IGNORE_ROBOTS_TXT", false),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.client.base_url = base_url.to_string();
        self
    }

    pub fn with_ignore_robots_txt(mut self, ignore: bool) -> Self {
        self.ignore_robots_txt = ignore;
        self
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .and_then(|val| parse_bool(&val))
        .unwrap_or(default)
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_spellings() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" 1 "), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn builders_override_fields() {
        let config = ScraperConfig::default()
            .with_base_url("http://127.0.0.1:9999")
            .with_ignore_robots_txt(true);
        assert_eq!(config.client.base_url, "http://127.0.0.1:9999");
        assert!(config.ignore_robots_txt);
        assert!(!ScraperConfig::default().ignore_robots_txt);
    }
}
