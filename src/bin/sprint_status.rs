//! Report the status of a board's current or configured sprint.

use std::process::ExitCode;

use clap::Parser;
use jira_report::cli::{self, Args, ReportKind};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    cli::run(ReportKind::SprintStatus, &args).await
}
