//! Configuration management for jira-report.
//!
//! Connection settings come from environment variables; everything about
//! what to report and where to write it comes from a JSON file. Both are
//! validated once at startup.

mod environment;
mod report;

use std::path::PathBuf;

use thiserror::Error;

pub use environment::{Environment, API_TOKEN_VAR, BASE_URL_VAR, EMAIL_VAR};
pub use report::{Outputs, ReportConfig};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is unset or blank.
    #[error("Missing configuration: environment variable {0} is not set")]
    MissingEnv(String),

    /// The config file could not be read.
    #[error("Failed to read config file {}: {source}", .path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for the expected schema.
    #[error("Failed to parse config file {}: {source}", .path.display())]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A value is present but not acceptable.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
