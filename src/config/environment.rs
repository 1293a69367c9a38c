//! JIRA connection settings read from the process environment.

use std::fmt;

use super::{ConfigError, Result};

/// Environment variable holding the JIRA base URL.
pub const BASE_URL_VAR: &str = "JIRA_BASE_URL";
/// Environment variable holding the account email.
pub const EMAIL_VAR: &str = "JIRA_EMAIL";
/// Environment variable holding the API token or personal access token.
pub const API_TOKEN_VAR: &str = "JIRA_API_TOKEN";

/// Connection details for a JIRA instance.
///
/// Read and validated once at startup, then passed by reference.
#[derive(Clone, PartialEq, Eq)]
pub struct Environment {
    /// The JIRA instance URL, without trailing slash.
    pub base_url: String,
    /// The user's email address.
    pub email: String,
    /// The API token.
    pub api_token: String,
}

impl Environment {
    /// Read the connection settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnv` naming the first variable that is
    /// unset or blank, or a validation error for a malformed URL.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the connection settings through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::MissingEnv(name.to_string()))
        };

        let env = Self {
            base_url: read(BASE_URL_VAR)?.trim_end_matches('/').to_string(),
            email: read(EMAIL_VAR)?,
            api_token: read(API_TOKEN_VAR)?,
        };
        env.validate()?;
        Ok(env)
    }

    /// Validate the connection settings.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` if the base URL does not use
    /// http(s).
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
            return Err(ConfigError::ValidationError(format!(
                "{} must start with http:// or https:// (got '{}')",
                BASE_URL_VAR, self.base_url
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
