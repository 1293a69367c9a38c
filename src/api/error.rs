//! API error types for the JIRA client.

use thiserror::Error;

/// Maximum number of body characters kept in error messages.
pub const SNIPPET_LEN: usize = 600;

/// Errors that can occur when talking to the JIRA REST and Agile APIs.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a status code of 400 or above.
    #[error("HTTP {status} from {url}\nHeaders: {headers}\nBody: {body}")]
    HttpStatus {
        status: u16,
        url: String,
        headers: String,
        body: String,
    },

    /// The server answered with something other than JSON, usually a login page.
    #[error(
        "Expected JSON but got Content-Type={content_type:?} at {url}{}\nFirst 600 bytes:\n{snippet}",
        redirect_hint(.redirected)
    )]
    ContentTypeMismatch {
        content_type: String,
        url: String,
        redirected: bool,
        snippet: String,
    },

    /// The body claimed to be JSON but could not be decoded.
    #[error("Failed to decode JSON at {url}: {message}\nFirst 600 bytes:\n{snippet}")]
    DecodeFailure {
        url: String,
        message: String,
        snippet: String,
    },

    /// A board, sprint or other resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network or transport error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The base URL could not be used to build a request URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// An empty list of API versions was supplied to the search client.
    #[error("No API versions to try")]
    NoVersions,
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// The HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the error looks like an authentication redirect to a login page.
    pub fn is_auth_redirect(&self) -> bool {
        matches!(
            self,
            ApiError::ContentTypeMismatch {
                redirected: true,
                ..
            }
        )
    }
}

fn redirect_hint(redirected: &bool) -> &'static str {
    if *redirected {
        "\n(Detected redirect chain, likely SSO/login; ensure API token/PAT auth is used.)"
    } else {
        ""
    }
}

/// Truncate a response body to at most [`SNIPPET_LEN`] characters.
pub fn snippet(body: &str) -> String {
    body.chars().take(SNIPPET_LEN).collect()
}
