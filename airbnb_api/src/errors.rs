//! Error types for the browser client.

/// Errors that can occur while fetching pages from the target site.
///
/// Redirect failures are kept apart from transport failures so callers can
/// tell "site unreachable" from "site behaving unexpectedly".
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request never produced a response (DNS, connect, TLS, body read).
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    /// The redirect chain did not settle within the configured depth.
    #[error("too many redirects ({depth}) while fetching {url}")]
    TooManyRedirects { url: String, depth: usize },
    /// A redirect status arrived without a `Location` header.
    #[error("redirect status {status} from {url} carried no Location header")]
    MissingLocationHeader { url: String, status: u16 },
    /// A URL could not be parsed or resolved.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    /// A header name or value could not be encoded.
    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },
}

impl Error {
    /// True for the redirect-specific failure kinds.
    pub fn is_redirect_failure(&self) -> bool {
        matches!(
            self,
            Error::TooManyRedirects { .. } | Error::MissingLocationHeader { .. }
        )
    }
}
