//! Error types for the pipeline layer.

use std::fmt;

use crate::embedded::ExtractionError;
use crate::schema::SchemaError;

/// Errors produced by a pipeline run, wrapping HTTP client errors and adding
/// policy, extraction and input validation failures.
#[derive(Debug)]
pub enum PipelineError {
    /// robots.txt disallows the request path for the session user agent.
    PolicyViolation { path: String },
    /// An error from the underlying HTTP client.
    Http(airbnb_api::Error),
    /// The page could not be turned into the expected JSON subtree.
    Extraction(ExtractionError),
    /// Caller-provided parameters failed validation.
    InvalidInput(String),
    /// The embedded projection schemas could not be loaded.
    Config(String),
}

/// Coarse classification used in logs and error results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    PolicyViolation,
    TransportFailure,
    RedirectFailure,
    ExtractionFailure,
    InvalidInput,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PolicyViolation { .. } => ErrorKind::PolicyViolation,
            Self::Http(e) if e.is_redirect_failure() => ErrorKind::RedirectFailure,
            Self::Http(_) => ErrorKind::TransportFailure,
            Self::Extraction(_) => ErrorKind::ExtractionFailure,
            Self::InvalidInput(_) | Self::Config(_) => ErrorKind::InvalidInput,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PolicyViolation => "policy_violation",
            Self::TransportFailure => "transport_failure",
            Self::RedirectFailure => "redirect_failure",
            Self::ExtractionFailure => "extraction_failure",
            Self::InvalidInput => "invalid_input",
        };
        f.write_str(name)
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PolicyViolation { path } => write!(
                f,
                "This path ({}) is disallowed by robots.txt. Set ignoreRobotsText \
                 (or pass --ignore-robots-txt) to fetch it anyway.",
                path
            ),
            Self::Http(e) => write!(f, "Request failed: {}", e),
            Self::Extraction(e) => write!(f, "Extraction failed: {}", e),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Extraction(e) => Some(e),
            _ => None,
        }
    }
}

impl From<airbnb_api::Error> for PipelineError {
    fn from(e: airbnb_api::Error) -> Self {
        Self::Http(e)
    }
}

impl From<ExtractionError> for PipelineError {
    fn from(e: ExtractionError) -> Self {
        Self::Extraction(e)
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        Self::Extraction(ExtractionError::Json(e))
    }
}

impl From<SchemaError> for PipelineError {
    fn from(e: SchemaError) -> Self {
        Self::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_variants() {
        let policy = PipelineError::PolicyViolation {
            path: "/s/Paris/homes".into(),
        };
        assert_eq!(policy.kind(), ErrorKind::PolicyViolation);
        assert!(policy.to_string().contains("ignoreRobotsText"));

        let redirect = PipelineError::from(airbnb_api::Error::TooManyRedirects {
            url: "https://www.airbnb.com/x".into(),
            depth: 5,
        });
        assert_eq!(redirect.kind(), ErrorKind::RedirectFailure);

        let missing = PipelineError::from(airbnb_api::Error::MissingLocationHeader {
            url: "https://www.airbnb.com/x".into(),
            status: 302,
        });
        assert_eq!(missing.kind(), ErrorKind::RedirectFailure);

        let extraction = PipelineError::from(ExtractionError::HttpStatus { status: 503 });
        assert_eq!(extraction.kind(), ErrorKind::ExtractionFailure);
        assert_eq!(
            extraction.to_string(),
            "Extraction failed: Page returned HTTP status 503"
        );

        let input = PipelineError::InvalidInput("bad date".into());
        assert_eq!(input.kind(), ErrorKind::InvalidInput);
        assert_eq!(input.kind().to_string(), "invalid_input");
    }

    #[test]
    fn sources_are_chained() {
        use std::error::Error as _;
        let err = PipelineError::from(ExtractionError::MissingSubtree {
            pointer: "/a".into(),
        });
        assert!(err.source().is_some());
        assert!(PipelineError::InvalidInput("x".into()).source().is_none());
    }
}
