//! JIRA API response types.
//!
//! Issues are kept as schema-less pass-through data: only the handful of
//! fields the reports read get typed accessors, everything else is carried
//! through to the JSON output untouched.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Label used when a grouping field is missing or empty.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Fields fetched when no field list is configured.
pub const DEFAULT_FIELDS: [&str; 12] = [
    "key",
    "summary",
    "issuetype",
    "status",
    "assignee",
    "reporter",
    "priority",
    "updated",
    "created",
    "resolutiondate",
    "components",
    "fixVersions",
];

/// A JIRA issue.
///
/// Returned as part of search results. `fields` is whatever the server sent
/// for the requested field list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// The issue key (e.g., "PROJ-123").
    #[serde(default)]
    pub key: String,
    /// The issue fields, keyed by field id.
    #[serde(default)]
    pub fields: Map<String, Value>,
    /// Other top-level keys (`id`, `self`, `expand`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Issue {
    /// Create an issue from a key and a field bag.
    pub fn new(key: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            key: key.into(),
            fields,
            extra: Map::new(),
        }
    }

    /// Look up a string nested under `fields` following `path`.
    ///
    /// Empty strings count as absent.
    pub fn field_str(&self, path: &[&str]) -> Option<&str> {
        let (first, rest) = path.split_first()?;
        let mut current = self.fields.get(*first)?;
        for key in rest {
            current = current.get(*key)?;
        }
        current.as_str().filter(|s| !s.is_empty())
    }

    /// Get the status name.
    pub fn status_name(&self) -> Option<&str> {
        self.field_str(&["status", "name"])
    }

    /// Get the status category name (To Do / In Progress / Done).
    pub fn status_category_name(&self) -> Option<&str> {
        self.field_str(&["status", "statusCategory", "name"])
    }

    /// Get the issue type name.
    pub fn issue_type_name(&self) -> Option<&str> {
        self.field_str(&["issuetype", "name"])
    }

    /// Get the assignee display name, if assigned.
    pub fn assignee_name(&self) -> Option<&str> {
        self.field_str(&["assignee", "displayName"])
    }

    /// Get the issue summary.
    pub fn summary(&self) -> Option<&str> {
        self.field_str(&["summary"])
    }

    /// Get the raw `updated` timestamp.
    pub fn updated(&self) -> Option<&str> {
        self.field_str(&["updated"])
    }

    /// Component names joined with ", ".
    pub fn component_names(&self) -> String {
        self.fields
            .get("components")
            .and_then(Value::as_array)
            .map(|components| {
                components
                    .iter()
                    .filter_map(|c| c.get("name").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default()
    }

    /// Read a numeric field such as story points.
    ///
    /// Accepts JSON numbers and numeric strings; anything else is `None`.
    pub fn numeric_field(&self, key: &str) -> Option<f64> {
        match self.fields.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|v| v.is_finite())
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.summary().unwrap_or_default())
    }
}

/// One page of a JQL search.
///
/// Returned by `GET /rest/api/{version}/search`. Pagination fields are
/// optional because some deployments omit them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    /// The index of the first result on this page.
    #[serde(default)]
    pub start_at: Option<u32>,
    /// The page size the server actually used.
    #[serde(default)]
    pub max_results: Option<u32>,
    /// Total number of matching issues.
    #[serde(default)]
    pub total: Option<u32>,
    /// The issues on this page.
    #[serde(default)]
    pub issues: Vec<Issue>,
}

/// The complete, ordered result of a paginated search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// API version that produced the result.
    pub api_version: String,
    /// Total reported by the last page.
    pub total: u32,
    /// All issues in server order.
    pub issues: Vec<Issue>,
}

/// Agile API paging envelope (`/rest/agile/1.0/...`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgilePage<T> {
    #[serde(default)]
    pub start_at: u32,
    #[serde(default)]
    pub max_results: u32,
    #[serde(default)]
    pub is_last: Option<bool>,
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,
}

/// A Scrum or Kanban board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// The board ID.
    pub id: u64,
    /// The board name.
    #[serde(default)]
    pub name: String,
    /// "scrum", "kanban" or "simple".
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub board_type: Option<String>,
}

impl Board {
    /// Whether this is a Scrum board.
    pub fn is_scrum(&self) -> bool {
        self.board_type.as_deref() == Some("scrum")
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.name, self.id)
    }
}

/// A sprint on a board.
///
/// Dates are kept exactly as the server sent them so they pass through to
/// the JSON output; see [`parse_jira_datetime`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    /// The sprint ID.
    pub id: u64,
    /// The sprint name.
    #[serde(default)]
    pub name: String,
    /// "active", "closed" or "future".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default)]
    pub start_date: Option<Value>,
    #[serde(default)]
    pub end_date: Option<Value>,
}

impl Sprint {
    /// A sprint known only by its ID.
    pub fn from_id(id: u64) -> Self {
        Self {
            id,
            name: format!("Sprint {}", id),
            state: None,
            start_date: None,
            end_date: None,
        }
    }
}

impl fmt::Display for Sprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.name, self.id)
    }
}

/// Parse a JIRA timestamp in either RFC 3339 or `%Y-%m-%dT%H:%M:%S%.f%z` form.
pub fn parse_jira_datetime(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
}
