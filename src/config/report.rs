//! Report configuration loaded from a JSON file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};
use crate::api::types::DEFAULT_FIELDS;
use crate::api::{ApiVersions, AuthScheme, RetryPolicy, SessionOptions};

/// Output file locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outputs {
    /// Where the pretty-printed JSON payload is written.
    #[serde(default)]
    pub json: Option<PathBuf>,
    /// Where the HTML document is written.
    #[serde(default)]
    pub html: Option<PathBuf>,
}

/// Settings shared by both report entry points.
///
/// Every key is optional; see the `Default` impl for fallback values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Project key or ID.
    pub project: String,
    /// Fields to request. `None` uses the report's default field list.
    pub fields: Option<Vec<String>>,
    /// Requested search page size.
    pub page_size: u32,
    /// `"auto"` or an explicit REST API version.
    pub api_version: String,
    pub outputs: Outputs,

    /// Explicit sprint to report on.
    pub sprint_id: Option<u64>,
    /// Use the board's active sprint when no sprint ID is configured.
    pub use_current_sprint: bool,
    /// Explicit board; otherwise the project's boards are searched.
    pub board_id: Option<u64>,
    /// Field holding story points, e.g. `customfield_10016`.
    pub story_points_field: Option<String>,

    /// Look-back window for the weekly report.
    pub days: u32,
    /// Issue types included in the weekly report.
    pub issue_types: Vec<String>,

    pub auth_scheme: AuthScheme,
    pub verify_ssl: bool,
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// Log every request and page at debug level.
    pub debug: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            project: "BUILD".to_string(),
            fields: None,
            page_size: 100,
            api_version: "auto".to_string(),
            outputs: Outputs::default(),
            sprint_id: None,
            use_current_sprint: true,
            board_id: None,
            story_points_field: None,
            days: 7,
            issue_types: vec!["Bug".to_string(), "Story".to_string(), "Task".to_string()],
            auth_scheme: AuthScheme::default(),
            verify_ssl: true,
            timeout_secs: SessionOptions::default().timeout.as_secs(),
            max_retries: RetryPolicy::default().max_retries,
            debug: false,
        }
    }
}

impl ReportConfig {
    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON for
    /// this schema, or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|e| match e {
            ConfigError::ParseError { source, .. } => ConfigError::ParseError {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Load the explicit path, or the default path when it exists.
    ///
    /// An explicit path must exist. A missing default path yields the
    /// built-in defaults.
    pub fn load_or_default(explicit: Option<&Path>, default_path: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None if default_path.exists() => Self::load(default_path),
            None => {
                tracing::debug!(path = %default_path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse and validate configuration from a JSON string.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content).map_err(|source| ConfigError::ParseError {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        if self.project.trim().is_empty() && self.board_id.is_none() {
            return Err(ConfigError::ValidationError(
                "project cannot be empty".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "page_size must be greater than zero".to_string(),
            ));
        }
        if self.api_version.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api_version cannot be empty".to_string(),
            ));
        }
        if self.days == 0 {
            return Err(ConfigError::ValidationError(
                "days must be greater than zero".to_string(),
            ));
        }
        if self.issue_types.iter().all(|t| t.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "issue_types must name at least one type".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Require a non-empty project.
    ///
    /// `validate` lets an empty project through when `board_id` is set,
    /// which only the sprint report can use; JQL built from the project
    /// needs this check.
    pub fn require_project(&self) -> Result<()> {
        if self.project.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "project cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Versions to try for searches.
    pub fn api_versions(&self) -> ApiVersions {
        ApiVersions::from_hint(&self.api_version)
    }

    /// Field list for the weekly report.
    pub fn fields_or_default(&self) -> Vec<String> {
        self.fields
            .clone()
            .unwrap_or_else(|| DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect())
    }

    /// HTTP client options derived from this configuration.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            verify_tls: self.verify_ssl,
            retry: RetryPolicy {
                max_retries: self.max_retries,
                ..RetryPolicy::default()
            },
            ..SessionOptions::default()
        }
    }

    /// JSON output path, falling back to `<stem>.json`.
    pub fn json_output(&self, stem: &str) -> PathBuf {
        self.outputs
            .json
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.json", stem)))
    }

    /// HTML output path, falling back to `<stem>.html`.
    pub fn html_output(&self, stem: &str) -> PathBuf {
        self.outputs
            .html
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.html", stem)))
    }
}
