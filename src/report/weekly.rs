//! "Updated in the last N days" report.

use serde::Serialize;
use tracing::info;

use crate::api::{Issue, JiraClient, SearchQuery};
use crate::config::ReportConfig;
use crate::error::Result;

/// Build the JQL for issues of the given types updated in the last `days`.
pub fn jql_for_updated(project: &str, issue_types: &[String], days: u32) -> String {
    let quoted_types = issue_types
        .iter()
        .map(|t| format!("\"{}\"", t.replace('"', "\\\"")))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "project = \"{}\" AND issuetype in ({}) AND updated >= -{}d ORDER BY updated DESC",
        project.replace('"', "\\\""),
        quoted_types,
        days
    )
}

/// JSON payload of the weekly report.
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyReport {
    pub count: usize,
    pub jql: String,
    pub issues: Vec<Issue>,
    /// Heading used by the HTML output.
    #[serde(skip)]
    pub title: String,
}

impl WeeklyReport {
    pub fn new(jql: String, title: String, issues: Vec<Issue>) -> Self {
        Self {
            count: issues.len(),
            jql,
            issues,
            title,
        }
    }
}

/// Title of the weekly report, e.g. "BUILD: Bug/Story/Task updated in the last 7 days".
pub fn weekly_title(project: &str, issue_types: &[String], days: u32) -> String {
    format!(
        "{}: {} updated in the last {} days",
        project,
        issue_types.join("/"),
        days
    )
}

/// Run the weekly search and assemble the report.
pub async fn build_weekly_report(client: &JiraClient, config: &ReportConfig) -> Result<WeeklyReport> {
    config.require_project()?;
    let jql = jql_for_updated(&config.project, &config.issue_types, config.days);
    let query = SearchQuery::new(jql.clone(), config.fields_or_default(), config.page_size);

    let result = client.search(&query, &config.api_versions()).await?;
    info!(count = result.issues.len(), version = %result.api_version, "Weekly report assembled");

    Ok(WeeklyReport::new(
        jql,
        weekly_title(&config.project, &config.issue_types, config.days),
        result.issues,
    ))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::{Auth, RetryPolicy, SessionOptions};
    use crate::config::ConfigError;
    use crate::error::AppError;

    fn types() -> Vec<String> {
        vec!["Bug".to_string(), "Story".to_string(), "Task".to_string()]
    }

    #[test]
    fn test_jql_for_updated() {
        assert_eq!(
            jql_for_updated("BUILD", &types(), 7),
            r#"project = "BUILD" AND issuetype in ("Bug","Story","Task") AND updated >= -7d ORDER BY updated DESC"#
        );
    }

    #[test]
    fn test_jql_escapes_quotes() {
        let jql = jql_for_updated("A\"B", &["Sub \"task\"".to_string()], 1);
        assert!(jql.contains(r#"project = "A\"B""#));
        assert!(jql.contains(r#"("Sub \"task\"")"#));
    }

    #[test]
    fn test_weekly_title() {
        assert_eq!(
            weekly_title("BUILD", &types(), 14),
            "BUILD: Bug/Story/Task updated in the last 14 days"
        );
    }

    #[test]
    fn test_payload_shape() {
        let report = WeeklyReport::new("jql".to_string(), "t".to_string(), vec![]);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value, json!({ "count": 0, "jql": "jql", "issues": [] }));
    }

    #[tokio::test]
    async fn test_build_weekly_report() {
        let server = MockServer::start().await;
        let config = ReportConfig {
            project: "WEB".to_string(),
            days: 3,
            page_size: 10,
            ..ReportConfig::default()
        };

        Mock::given(method("GET"))
            .and(path("/rest/api/3/search"))
            .and(query_param(
                "jql",
                jql_for_updated("WEB", &config.issue_types, 3).as_str(),
            ))
            .and(query_param("maxResults", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "startAt": 0,
                "maxResults": 10,
                "total": 2,
                "issues": [
                    { "key": "WEB-2", "fields": { "summary": "two" } },
                    { "key": "WEB-1", "fields": { "summary": "one" } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let options = SessionOptions {
            retry: RetryPolicy::none(),
            ..SessionOptions::default()
        };
        let client = JiraClient::new(&server.uri(), Auth::basic("a@b.c", "t"), &options).unwrap();
        let report = build_weekly_report(&client, &config).await.unwrap();

        assert_eq!(report.count, 2);
        assert_eq!(report.issues[0].key, "WEB-2");
        assert_eq!(report.title, "WEB: Bug/Story/Task updated in the last 3 days");
    }

    #[tokio::test]
    async fn test_empty_project_is_rejected_even_with_board_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = ReportConfig {
            project: String::new(),
            board_id: Some(3),
            ..ReportConfig::default()
        };
        let client = JiraClient::new(
            &server.uri(),
            Auth::basic("a@b.c", "t"),
            &SessionOptions::default(),
        )
        .unwrap();
        let err = build_weekly_report(&client, &config).await.unwrap_err();

        assert!(matches!(err, AppError::Config(ConfigError::ValidationError(_))));
        assert_eq!(err.exit_code(), 2);
    }
}
