mod client;
mod cookie_jar;
mod errors;
mod query;
pub mod robots;
pub mod user_agent;
pub use self::client::{
    BrowserClient, ClientConfig, FetchResponse, RequestPacing, DEFAULT_BASE_URL,
    DEFAULT_MAX_REDIRECTS,
};
pub use self::cookie_jar::CookieJar;
pub use self::errors::Error;
pub use self::query::{Guests, ListingQuery, Query, QueryCommon, SearchQuery};
pub use self::robots::RobotsRuleSet;
pub use reqwest::{header, StatusCode};
pub use url::Url;
