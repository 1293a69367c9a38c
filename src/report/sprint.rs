//! Sprint status report.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::aggregate::Aggregates;
use crate::api::types::parse_jira_datetime;
use crate::api::{Board, Issue, JiraClient, SearchQuery, Sprint};
use crate::config::ReportConfig;
use crate::error::Result;

/// Fields requested for sprint issues when none are configured.
pub const SPRINT_FIELDS: [&str; 10] = [
    "key",
    "summary",
    "issuetype",
    "status",
    "assignee",
    "priority",
    "updated",
    "created",
    "resolutiondate",
    "components",
];

/// Issue counts reported in the metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Counts {
    pub issues: usize,
}

/// The board a report was built for, as written to the metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardRef {
    pub id: u64,
    pub name: String,
}

impl From<Board> for BoardRef {
    fn from(board: Board) -> Self {
        Self {
            id: board.id,
            name: board.name,
        }
    }
}

impl fmt::Display for BoardRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.name, self.id)
    }
}

/// The reported sprint. Dates are the server's raw values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintRef {
    pub id: u64,
    pub name: String,
    pub start_date: Option<Value>,
    pub end_date: Option<Value>,
}

impl SprintRef {
    /// Start date as `YYYY-MM-DD` when parseable, else the raw value.
    pub fn start_label(&self) -> Option<String> {
        date_label(self.start_date.as_ref())
    }

    /// End date as `YYYY-MM-DD` when parseable, else the raw value.
    pub fn end_label(&self) -> Option<String> {
        date_label(self.end_date.as_ref())
    }
}

impl From<Sprint> for SprintRef {
    fn from(sprint: Sprint) -> Self {
        Self {
            id: sprint.id,
            name: sprint.name,
            start_date: sprint.start_date,
            end_date: sprint.end_date,
        }
    }
}

impl fmt::Display for SprintRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.name, self.id)
    }
}

fn date_label(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(raw) => Some(
            parse_jira_datetime(raw)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| raw.clone()),
        ),
        other => Some(other.to_string()),
    }
}

/// Report metadata: what was reported on and the totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMeta {
    pub project: String,
    pub board: BoardRef,
    pub sprint: SprintRef,
    pub counts: Counts,
    pub story_points_total: f64,
}

/// A sprint status report.
///
/// Built once from the fetched issues; the fields are not meant to be
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SprintReport {
    pub meta: ReportMeta,
    pub aggregates: Aggregates,
    pub issues: Vec<Issue>,
    /// Field the story points were read from, for per-issue rendering.
    #[serde(skip)]
    pub story_points_field: Option<String>,
}

impl SprintReport {
    /// Aggregate `issues` and assemble the report.
    pub fn new(
        project: impl Into<String>,
        board: Board,
        sprint: Sprint,
        issues: Vec<Issue>,
        story_points_field: Option<&str>,
    ) -> Self {
        let aggregates = Aggregates::from_issues(&issues, story_points_field);
        Self {
            meta: ReportMeta {
                project: project.into(),
                board: board.into(),
                sprint: sprint.into(),
                counts: Counts {
                    issues: issues.len(),
                },
                story_points_total: aggregates.story_points_total,
            },
            aggregates,
            issues,
            story_points_field: story_points_field.map(str::to_string),
        }
    }
}

/// JQL selecting every issue in a sprint, in board rank order.
pub fn jql_for_sprint(sprint_id: u64) -> String {
    format!("sprint = {} ORDER BY Rank ASC", sprint_id)
}

/// Fields to request for a sprint report.
///
/// The configured story points field is appended when missing so the
/// aggregation can read it.
pub fn sprint_fields(config: &ReportConfig) -> Vec<String> {
    let mut fields = config
        .fields
        .clone()
        .unwrap_or_else(|| SPRINT_FIELDS.iter().map(|f| f.to_string()).collect());

    if let Some(sp) = config.story_points_field.as_deref() {
        if !fields.iter().any(|f| f == sp) {
            fields.push(sp.to_string());
        }
    }
    fields
}

/// Resolve board and sprint, fetch the sprint's issues and build the report.
///
/// Without a configured `sprint_id` the board's active sprint is used, even
/// when `use_current_sprint` is false.
pub async fn build_sprint_report(client: &JiraClient, config: &ReportConfig) -> Result<SprintReport> {
    if config.board_id.is_none() {
        config.require_project()?;
    }
    let board = client
        .resolve_board(Some(config.project.as_str()), config.board_id)
        .await?;

    let sprint = match config.sprint_id {
        Some(id) => Sprint::from_id(id),
        None => {
            if !config.use_current_sprint {
                debug!("No sprint_id configured, using the active sprint");
            }
            client.active_sprint(board.id).await?
        }
    };

    let query = SearchQuery::new(
        jql_for_sprint(sprint.id),
        sprint_fields(config),
        config.page_size,
    );
    let result = client.search(&query, &config.api_versions()).await?;

    let report = SprintReport::new(
        config.project.clone(),
        board,
        sprint,
        result.issues,
        config.story_points_field.as_deref(),
    );
    info!(
        sprint = %report.meta.sprint,
        issues = report.meta.counts.issues,
        story_points = report.meta.story_points_total,
        "Sprint report assembled"
    );
    Ok(report)
}
