//! Authentication handling for the JIRA API.
//!
//! Two mutually exclusive schemes are supported: Basic auth (email + API
//! token) for JIRA Cloud, and Bearer auth with a personal access token for
//! JIRA Server / Data Center.

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

/// The authentication scheme requested by the report configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// `Authorization: Basic base64(email:token)`.
    #[default]
    Basic,
    /// `Authorization: Bearer <token>`.
    Bearer,
}

/// Authentication credentials for JIRA.
///
/// The header value is computed once on construction; raw tokens are not kept.
#[derive(Clone)]
pub enum Auth {
    /// Basic auth with the user's email address.
    Basic { email: String, auth_header: String },
    /// Bearer auth with a personal access token.
    Bearer { auth_header: String },
}

impl Auth {
    /// Create Basic credentials from email and API token.
    pub fn basic(email: &str, token: &str) -> Self {
        let email = email.trim();
        Self::Basic {
            email: email.to_string(),
            auth_header: build_basic_header(email, token.trim()),
        }
    }

    /// Create Bearer credentials from a personal access token.
    pub fn bearer(token: &str) -> Self {
        Self::Bearer {
            auth_header: format!("Bearer {}", token.trim()),
        }
    }

    /// Build credentials for the given scheme.
    ///
    /// The Bearer scheme ignores the email address.
    pub fn for_scheme(scheme: AuthScheme, email: &str, token: &str) -> Self {
        match scheme {
            AuthScheme::Basic => Self::basic(email, token),
            AuthScheme::Bearer => Self::bearer(token),
        }
    }

    /// Get the complete `Authorization` header value.
    pub fn header_value(&self) -> &str {
        match self {
            Auth::Basic { auth_header, .. } | Auth::Bearer { auth_header } => auth_header,
        }
    }

    /// The scheme these credentials use.
    pub fn scheme(&self) -> AuthScheme {
        match self {
            Auth::Basic { .. } => AuthScheme::Basic,
            Auth::Bearer { .. } => AuthScheme::Bearer,
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::Basic { email, .. } => f.debug_struct("Basic").field("email", email).finish(),
            Auth::Bearer { .. } => f.write_str("Bearer"),
        }
    }
}

/// Build the Basic Auth header value.
///
/// Encodes "email:token" in Base64 and prepends "Basic ".
fn build_basic_header(email: &str, token: &str) -> String {
    let credentials = format!("{}:{}", email, token);
    let encoded = BASE64.encode(credentials.as_bytes());
    format!("Basic {}", encoded)
}
