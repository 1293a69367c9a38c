//! Shared entry-point glue for the report binaries.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use crate::api::{Auth, JiraClient};
use crate::config::{Environment, ReportConfig};
use crate::error::Result;
use crate::logging;
use crate::render::{issues_html, sprint_html};
use crate::report::{build_sprint_report, build_weekly_report, write_html, write_json};

/// Command line arguments shared by both report binaries.
#[derive(Parser, Debug, Clone, Default)]
#[command(version, about = "Generate a JIRA report as JSON and HTML")]
pub struct Args {
    /// Path to the JSON report configuration.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Which report a binary produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    WeeklyUpdated,
    SprintStatus,
}

impl ReportKind {
    /// File stem for default config and output paths.
    pub fn stem(self) -> &'static str {
        match self {
            ReportKind::WeeklyUpdated => "weekly_updated",
            ReportKind::SprintStatus => "sprint_status",
        }
    }

    /// Config file used when `--config` is not given.
    pub fn default_config_path(self) -> PathBuf {
        Path::new("configs").join(format!("{}.json", self.stem()))
    }

    fn failure_label(self) -> &'static str {
        match self {
            ReportKind::WeeklyUpdated => "Weekly updated report failed",
            ReportKind::SprintStatus => "Sprint status report failed",
        }
    }
}

/// Run a report end to end and map the outcome to an exit code.
pub async fn run(kind: ReportKind, args: &Args) -> ExitCode {
    match execute(kind, args).await {
        Ok(summary) => {
            println!("{}", summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", kind.failure_label(), e);
            if let Some(hint) = e.suggested_action() {
                eprintln!("Hint: {}", hint);
            }
            ExitCode::from(e.exit_code())
        }
    }
}

async fn execute(kind: ReportKind, args: &Args) -> Result<String> {
    let config = ReportConfig::load_or_default(args.config.as_deref(), &kind.default_config_path())?;
    if let Err(e) = logging::init(config.debug) {
        eprintln!("Logging unavailable: {}", e);
    }

    let env = Environment::from_env()?;
    generate(kind, &config, &env).await
}

/// Build the report, then write both output files.
///
/// Nothing is written unless the whole report was assembled. Returns the
/// run summary.
pub async fn generate(kind: ReportKind, config: &ReportConfig, env: &Environment) -> Result<String> {
    let auth = Auth::for_scheme(config.auth_scheme, &env.email, &env.api_token);
    let client = JiraClient::new(&env.base_url, auth, &config.session_options())?;

    let json_path = config.json_output(kind.stem());
    let html_path = config.html_output(kind.stem());

    let summary = match kind {
        ReportKind::WeeklyUpdated => {
            let report = build_weekly_report(&client, config).await?;
            let html = issues_html(&report.issues, client.base_url(), &report.title);
            write_json(&json_path, &report)?;
            write_html(&html_path, &html)?;
            format!("{} issues: {}\nJQL: {}", report.count, report.title, report.jql)
        }
        ReportKind::SprintStatus => {
            let report = build_sprint_report(&client, config).await?;
            let html = sprint_html(&report, client.base_url());
            write_json(&json_path, &report)?;
            write_html(&html_path, &html)?;
            format!(
                "Sprint {} on board {}: {} issues, {:.2} story points",
                report.meta.sprint, report.meta.board, report.meta.counts.issues,
                report.meta.story_points_total
            )
        }
    };

    info!(json = %json_path.display(), html = %html_path.display(), "Report written");
    Ok(format!(
        "{}\nWrote {}\nWrote {}",
        summary,
        json_path.display(),
        html_path.display()
    ))
}
