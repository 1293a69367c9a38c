//! Centralized error types for jira-report.
//!
//! This module aggregates every failure a report run can hit and maps it to
//! a process exit code. All error types use `thiserror`.

use std::path::PathBuf;

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;

/// Exit code for a report that failed to generate.
pub const EXIT_FAILURE: u8 = 1;
/// Exit code for missing or invalid configuration.
pub const EXIT_CONFIG: u8 = 2;

/// The main application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// API-related errors.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Writing an output file failed.
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding the JSON payload failed.
    #[error("Failed to encode JSON: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl AppError {
    /// Create an IO error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error.
    ///
    /// Configuration problems exit with 2, everything else with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) => EXIT_CONFIG,
            _ => EXIT_FAILURE,
        }
    }

    /// Get a suggested action for the user.
    pub fn suggested_action(&self) -> Option<&'static str> {
        match self {
            AppError::Config(ConfigError::MissingEnv(_)) => {
                Some("Set JIRA_BASE_URL, JIRA_EMAIL and JIRA_API_TOKEN before running.")
            }
            AppError::Api(ApiError::ContentTypeMismatch { .. }) => Some(
                "The server answered with a web page instead of JSON. Check the base URL and that the API token is accepted.",
            ),
            AppError::Api(e) if e.status() == Some(401) => {
                Some("Check your API token at https://id.atlassian.com/manage-profile/security/api-tokens")
            }
            AppError::Api(e) if e.status() == Some(404) => {
                Some("Check the project key, board id and api_version in the config file.")
            }
            AppError::Api(ApiError::Network(_)) => {
                Some("Check your network connection and JIRA_BASE_URL.")
            }
            _ => None,
        }
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
