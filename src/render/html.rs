//! maud templates for the HTML reports.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::api::types::UNKNOWN_LABEL;
use crate::api::Issue;
use crate::report::aggregate::story_points;
use crate::report::{Buckets, SprintReport};

const STYLE: &str = "
    body { font-family: -apple-system, Segoe UI, Arial, sans-serif; margin: 24px; color: #172b4d; }
    h1 { font-size: 22px; margin-bottom: 4px; }
    h2 { font-size: 17px; margin-top: 28px; }
    .meta { color: #5e6c84; margin: 2px 0; }
    table { border-collapse: collapse; width: 100%; margin-top: 8px; }
    th, td { border: 1px solid #dfe1e6; padding: 6px 8px; text-align: left; vertical-align: top; }
    th { background: #f4f5f7; }
    tr:nth-child(even) td { background: #fafbfc; }
    td.num, th.num { text-align: right; white-space: nowrap; }
    .aggregates { display: flex; flex-wrap: wrap; gap: 24px; }
    .aggregates section { flex: 1 1 260px; }
    a { color: #0052cc; text-decoration: none; }
";

/// Render a flat issue list as a standalone HTML document.
pub fn issues_html(issues: &[Issue], base_url: &str, title: &str) -> String {
    let body = html! {
        h1 { (title) }
        p.meta { (issues.len()) " issues" }
        table {
            thead {
                tr {
                    th { "Key" }
                    th { "Summary" }
                    th { "Type" }
                    th { "Status" }
                    th { "Assignee" }
                    th { "Updated" }
                    th { "Components" }
                }
            }
            tbody {
                @for issue in issues {
                    tr {
                        td { (issue_link(base_url, &issue.key)) }
                        td { (issue.summary().unwrap_or_default()) }
                        td { (issue.issue_type_name().unwrap_or_default()) }
                        td { (issue.status_name().unwrap_or_default()) }
                        td { (issue.assignee_name().unwrap_or("Unassigned")) }
                        td { (issue.updated().unwrap_or_default()) }
                        td { (issue.component_names()) }
                    }
                }
            }
        }
    };
    page(title, body).into_string()
}

/// Render a sprint report as a standalone HTML document.
pub fn sprint_html(report: &SprintReport, base_url: &str) -> String {
    let meta = &report.meta;
    let title = format!("{}: {}", meta.project, meta.sprint.name);
    let sp_field = report.story_points_field.as_deref();

    let body = html! {
        h1 { (title) }
        p.meta { "Board: " (meta.board.to_string()) }
        p.meta {
            "Sprint: " (meta.sprint.name) " (#" (meta.sprint.id) ") "
            (meta.sprint.start_label().unwrap_or_else(|| "n/a".to_string())) " to "
            (meta.sprint.end_label().unwrap_or_else(|| "n/a".to_string()))
        }
        p.meta {
            "Issues: " (meta.counts.issues)
            " | Story points: " (format_points(meta.story_points_total))
        }

        div.aggregates {
            (aggregate_table("By status", &report.aggregates.by_status))
            (aggregate_table("By status category", &report.aggregates.by_category))
            (aggregate_table("By type", &report.aggregates.by_type))
        }

        h2 { "Issues" }
        table {
            thead {
                tr {
                    th { "Key" }
                    th { "Summary" }
                    th { "Type" }
                    th { "Status" }
                    th { "Category" }
                    th { "Assignee" }
                    th.num { "SP" }
                }
            }
            tbody {
                @for issue in &report.issues {
                    tr {
                        td { (issue_link(base_url, &issue.key)) }
                        td { (issue.summary().unwrap_or_default()) }
                        td { (issue.issue_type_name().unwrap_or(UNKNOWN_LABEL)) }
                        td { (issue.status_name().unwrap_or(UNKNOWN_LABEL)) }
                        td { (issue.status_category_name().unwrap_or(UNKNOWN_LABEL)) }
                        td { (issue.assignee_name().unwrap_or("Unassigned")) }
                        td.num { (format_points(story_points(issue, sp_field))) }
                    }
                }
            }
        }
    };
    page(&title, body).into_string()
}

fn page(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (title) }
                style { (PreEscaped(STYLE)) }
            }
            body { (body) }
        }
    }
}

fn aggregate_table(heading: &str, buckets: &Buckets) -> Markup {
    let mut rows: Vec<_> = buckets.iter().collect();
    rows.sort_by_key(|(label, _)| label.to_lowercase());

    html! {
        section {
            h2 { (heading) }
            table {
                thead {
                    tr {
                        th { "Label" }
                        th.num { "Count" }
                        th.num { "SP" }
                    }
                }
                tbody {
                    @for (label, bucket) in rows {
                        tr {
                            td { (label) }
                            td.num { (bucket.count) }
                            td.num { (format_points(bucket.sp)) }
                        }
                    }
                }
            }
        }
    }
}

fn issue_link(base_url: &str, key: &str) -> Markup {
    let href = format!(
        "{}/browse/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(key)
    );
    html! { a href=(href) { (key) } }
}

fn format_points(points: f64) -> String {
    format!("{:.2}", points)
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map};

    use super::*;
    use crate::api::{Board, Sprint};

    const BASE: &str = "https://jira.example.com";

    fn issue(key: &str, summary: &str, status: &str, sp: f64) -> Issue {
        let mut fields = Map::new();
        fields.insert("summary".to_string(), json!(summary));
        fields.insert("status".to_string(), json!({ "name": status }));
        fields.insert("issuetype".to_string(), json!({ "name": "Story" }));
        fields.insert("customfield_10016".to_string(), json!(sp));
        Issue::new(key, fields)
    }

    fn report(issues: Vec<Issue>) -> SprintReport {
        let board = Board {
            id: 4,
            name: "Platform".to_string(),
            board_type: Some("scrum".to_string()),
        };
        SprintReport::new(
            "PLAT",
            board,
            Sprint::from_id(31),
            issues,
            Some("customfield_10016"),
        )
    }

    #[test]
    fn test_issues_html_links_and_title() {
        let html = issues_html(
            &[issue("PLAT-1", "First", "Open", 0.0)],
            BASE,
            "PLAT: Bug/Story/Task updated in the last 7 days",
        );

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>PLAT: Bug/Story/Task updated in the last 7 days</title>"));
        assert!(html.contains(r#"href="https://jira.example.com/browse/PLAT-1""#));
        assert!(html.contains("1 issues"));
    }

    #[test]
    fn test_issue_values_are_escaped() {
        let html = issues_html(
            &[issue("X-1", "<script>alert('x')</script>", "Open", 0.0)],
            BASE,
            "Title & <b>more</b>",
        );

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Title &amp; &lt;b&gt;more&lt;/b&gt;"));
    }

    #[test]
    fn test_empty_issue_list() {
        let html = issues_html(&[], BASE, "Nothing");
        assert!(html.contains("0 issues"));
        assert!(html.contains("<tbody></tbody>"));
    }

    #[test]
    fn test_sprint_html_totals_and_points() {
        let html = sprint_html(
            &report(vec![
                issue("PLAT-1", "One", "Done", 3.0),
                issue("PLAT-2", "Two", "Done", 2.5),
            ]),
            BASE,
        );

        assert!(html.contains("<title>PLAT: Sprint 31</title>"));
        assert!(html.contains("Platform (#4)"));
        assert!(html.contains("Story points: 5.50"));
        assert!(html.contains("2.50"));
        assert!(html.contains(r#"href="https://jira.example.com/browse/PLAT-2""#));
        assert!(html.contains("n/a"));
    }

    #[test]
    fn test_aggregate_labels_sorted_case_insensitively() {
        let html = sprint_html(
            &report(vec![
                issue("A-1", "", "review", 1.0),
                issue("A-2", "", "Backlog", 1.0),
                issue("A-3", "", "Zed", 1.0),
            ]),
            BASE,
        );

        let backlog = html.find("<td>Backlog</td>").unwrap();
        let review = html.find("<td>review</td>").unwrap();
        let zed = html.find("<td>Zed</td>").unwrap();
        assert!(backlog < review);
        assert!(review < zed);
    }
}
