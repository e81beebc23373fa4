//! Browser-emulating HTTP client for the listing site.

use std::time::Duration;

use rand::Rng;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, COOKIE, HOST, LOCATION, ORIGIN, REFERER, USER_AGENT,
};
use reqwest::StatusCode;
use url::Url;

use crate::{cookie_jar::CookieJar, user_agent::get_user_agent, Error};

/// Production origin.
pub const DEFAULT_BASE_URL: &str = "https://www.airbnb.com";

/// A request that would be issued at this redirect depth fails instead.
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
    ),
    ("accept-language", "en-US,en;q=0.9"),
    ("cache-control", "no-cache"),
    ("pragma", "no-cache"),
    ("upgrade-insecure-requests", "1"),
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "same-origin"),
    ("sec-fetch-user", "?1"),
];

/// Randomized delay inserted before every request so the request stream
/// has no fixed-interval signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPacing {
    pub min_delay: Duration,
    pub jitter: Duration,
}

impl Default for RequestPacing {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(100),
            jitter: Duration::from_millis(200),
        }
    }
}

impl RequestPacing {
    /// No delay at all. Used by tests against a local mock server.
    pub fn disabled() -> Self {
        Self {
            min_delay: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }

    pub fn next_delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.min_delay;
        }
        self.min_delay + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }
}

/// Construction-time settings for [`BrowserClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub max_redirects: usize,
    pub pacing: RequestPacing,
    /// Fixed user agent. `None` picks one at random for the session.
    pub user_agent: Option<String>,
    /// Whole-request timeout. `None` keeps the transport default.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            pacing: RequestPacing::default(),
            user_agent: None,
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Reads overrides from `AIRBNB_*` environment variables, falling back to
    /// the defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("AIRBNB_BASE_URL").unwrap_or(defaults.base_url),
            max_redirects: env_usize("AIRBNB_MAX_REDIRECTS", defaults.max_redirects),
            pacing: RequestPacing {
                min_delay: Duration::from_millis(env_u64(
                    "AIRBNB_PACING_MIN_MS",
                    defaults.pacing.min_delay.as_millis() as u64,
                )),
                jitter: Duration::from_millis(env_u64(
                    "AIRBNB_PACING_JITTER_MS",
                    defaults.pacing.jitter.as_millis() as u64,
                )),
            },
            user_agent: std::env::var("AIRBNB_USER_AGENT")
                .ok()
                .filter(|ua| !ua.trim().is_empty()),
            timeout: std::env::var("AIRBNB_TIMEOUT_SECS")
                .ok()
                .and_then(|val| val.parse::<u64>().ok())
                .map(Duration::from_secs),
        }
    }
}

/// A fully received, non-redirect response.
#[derive(Debug)]
pub struct FetchResponse {
    /// URL the response was served from, after any redirects.
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// HTTP client that looks like one consistent desktop browser session.
///
/// Owns the session cookie jar and the user agent chosen at construction.
/// Redirects are never followed by the transport: each hop is replayed by
/// [`BrowserClient::fetch`] so cookies set mid-chain land in the jar.
pub struct BrowserClient {
    base_url: Url,
    http: reqwest::Client,
    user_agent: String,
    cookies: CookieJar,
    max_redirects: usize,
    pacing: RequestPacing,
}

impl BrowserClient {
    /// Creates a client for the production origin with default settings.
    pub fn new() -> Result<Self, Error> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a client with a custom origin. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::with_config(ClientConfig {
            base_url: base_url.to_string(),
            ..ClientConfig::default()
        })
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, Error> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            tracing::error!("Invalid base URL {}: {}", config.base_url, e);
            Error::InvalidUrl(format!("{}: {}", config.base_url, e))
        })?;
        let user_agent = config
            .user_agent
            .unwrap_or_else(|| get_user_agent().to_string());

        let mut builder = reqwest::Client::builder()
            .user_agent(user_agent.as_str())
            .redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| {
            tracing::error!("Failed to build HTTP client: {}", e);
            Error::Transport(e)
        })?;

        tracing::debug!("Browser session user agent: {}", user_agent);

        Ok(Self {
            base_url,
            http,
            user_agent,
            cookies: CookieJar::new(),
            max_redirects: config.max_redirects,
            pacing: config.pacing,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The user agent sent on every request of this session.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    /// Resolves `path` against the base URL.
    pub fn url_for(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(path)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Fetches `url`, replaying redirects by hand.
    ///
    /// Every response, redirect or not and whatever its status, feeds the
    /// cookie jar. Non-redirect statuses are returned as-is.
    pub async fn fetch(
        &self,
        url: &Url,
        overrides: Option<&HeaderMap>,
    ) -> Result<FetchResponse, Error> {
        let mut current = url.clone();
        let mut depth = 0usize;

        loop {
            let headers = self.build_headers(&current, overrides)?;
            self.pace().await;

            tracing::debug!("GET {} (redirect depth {})", current, depth);
            let resp = self
                .http
                .get(current.clone())
                .headers(headers)
                .send()
                .await
                .map_err(|e| {
                    tracing::error!("Failed to get {}: {}", current, e);
                    Error::Transport(e)
                })?;

            self.cookies.record(resp.headers());
            let status = resp.status();

            if is_redirect(status) {
                let location = resp
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .ok_or_else(|| Error::MissingLocationHeader {
                        url: current.to_string(),
                        status: status.as_u16(),
                    })?;
                let next = current
                    .join(location)
                    .map_err(|e| Error::InvalidUrl(format!("{}: {}", location, e)))?;

                depth += 1;
                if depth >= self.max_redirects {
                    tracing::warn!("Redirect chain from {} exceeded {} hops", url, depth);
                    return Err(Error::TooManyRedirects {
                        url: url.to_string(),
                        depth,
                    });
                }
                tracing::debug!("{} redirected ({}) to {}", current, status, next);
                current = next;
                continue;
            }

            let headers = resp.headers().clone();
            let body = resp.text().await.map_err(|e| {
                tracing::error!("Failed to read response body from {}: {}", current, e);
                Error::Transport(e)
            })?;

            return Ok(FetchResponse {
                url: current,
                status,
                headers,
                body,
            });
        }
    }

    /// Visits the site root so the anti-automation cookies exist before
    /// any deep page is requested.
    pub async fn warm_up(&self) -> Result<StatusCode, Error> {
        let root = self.base_url.clone();
        let resp = self.fetch(&root, None).await?;
        tracing::debug!(
            "Session warm-up returned {} with {} cookies",
            resp.status,
            self.cookies.len()
        );
        Ok(resp.status)
    }

    /// Fetches `/robots.txt`. A non-2xx response yields `None`.
    pub async fn fetch_robots_txt(&self) -> Result<Option<String>, Error> {
        let url = self.url_for("/robots.txt")?;
        let resp = self.fetch(&url, None).await?;
        if !resp.is_success() {
            tracing::debug!("robots.txt returned {}", resp.status);
            return Ok(None);
        }
        Ok(Some(resp.body))
    }

    fn build_headers(&self, url: &Url, overrides: Option<&HeaderMap>) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        for &(name, value) in BROWSER_HEADERS {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        headers.insert(USER_AGENT, header_value(USER_AGENT, &self.user_agent)?);

        let host = url
            .host_str()
            .ok_or_else(|| Error::InvalidUrl(format!("{} has no host", url)))?;
        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let origin = url.origin().ascii_serialization();
        headers.insert(HOST, header_value(HOST, &host)?);
        headers.insert(ORIGIN, header_value(ORIGIN, &origin)?);
        headers.insert(REFERER, header_value(REFERER, &format!("{}/", origin))?);

        let cookie = self.cookies.serialize();
        if !cookie.is_empty() {
            headers.insert(COOKIE, header_value(COOKIE, &cookie)?);
        }

        if let Some(overrides) = overrides {
            for name in overrides.keys() {
                headers.remove(name);
            }
            for (name, value) in overrides.iter() {
                headers.append(name.clone(), value.clone());
            }
        }

        Ok(headers)
    }

    async fn pace(&self) {
        let delay = self.pacing.next_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::TEMPORARY_REDIRECT
    )
}

fn header_value(name: HeaderName, value: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, PRAGMA, UPGRADE_INSECURE_REQUESTS};

    fn client() -> BrowserClient {
        BrowserClient::with_config(ClientConfig {
            base_url: "https://www.airbnb.com".to_string(),
            pacing: RequestPacing::disabled(),
            user_agent: Some("Mozilla/5.0 (TestOS) Test/1.0".to_string()),
            ..ClientConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn pacing_stays_within_bounds() {
        let pacing = RequestPacing::default();
        for _ in 0..50 {
            let delay = pacing.next_delay();
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(300));
        }
        assert_eq!(RequestPacing::disabled().next_delay(), Duration::ZERO);
    }

    #[test]
    fn headers_carry_session_identity() {
        let client = client();
        let url = Url::parse("https://www.airbnb.com/s/Paris/homes").unwrap();
        let headers = client.build_headers(&url, None).unwrap();
        assert_eq!(headers[USER_AGENT], "Mozilla/5.0 (TestOS) Test/1.0");
        assert_eq!(headers[HOST], "www.airbnb.com");
        assert_eq!(headers[ORIGIN], "https://www.airbnb.com");
        assert_eq!(headers[REFERER], "https://www.airbnb.com/");
        assert!(headers.contains_key(ACCEPT));
        assert!(headers.contains_key(ACCEPT_LANGUAGE));
        assert!(headers.contains_key(CACHE_CONTROL));
        assert!(headers.contains_key(PRAGMA));
        assert!(headers.contains_key(UPGRADE_INSECURE_REQUESTS));
        assert!(!headers.contains_key(COOKIE));
    }

    #[test]
    fn host_keeps_explicit_port() {
        let client = client();
        let url = Url::parse("http://127.0.0.1:8080/rooms/1").unwrap();
        let headers = client.build_headers(&url, None).unwrap();
        assert_eq!(headers[HOST], "127.0.0.1:8080");
        assert_eq!(headers[ORIGIN], "http://127.0.0.1:8080");
    }

    #[test]
    fn cookie_header_follows_jar() {
        let client = client();
        client.cookies().record_set_cookies(["bev=1", "cdn_exp=2; Path=/"]);
        let url = client.url_for("/").unwrap();
        let headers = client.build_headers(&url, None).unwrap();
        assert_eq!(headers[COOKIE], "bev=1; cdn_exp=2");
    }

    #[test]
    fn overrides_replace_defaults() {
        let client = client();
        let mut overrides = HeaderMap::new();
        overrides.insert(ACCEPT, HeaderValue::from_static("application/json"));
        overrides.insert(REFERER, HeaderValue::from_static("https://www.airbnb.com/s/homes"));
        let url = client.url_for("/rooms/1").unwrap();
        let headers = client.build_headers(&url, Some(&overrides)).unwrap();
        assert_eq!(headers[ACCEPT], "application/json");
        assert_eq!(headers[REFERER], "https://www.airbnb.com/s/homes");
        assert_eq!(headers.get_all(ACCEPT).iter().count(), 1);
    }

    #[test]
    fn redirect_statuses() {
        assert!(is_redirect(StatusCode::MOVED_PERMANENTLY));
        assert!(is_redirect(StatusCode::FOUND));
        assert!(is_redirect(StatusCode::TEMPORARY_REDIRECT));
        assert!(!is_redirect(StatusCode::OK));
        assert!(!is_redirect(StatusCode::NOT_MODIFIED));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = BrowserClient::with_base_url("not a url");
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }
}
