//! Report issues of selected types updated in the last N days.

use std::process::ExitCode;

use clap::Parser;
use jira_report::cli::{self, Args, ReportKind};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    cli::run(ReportKind::WeeklyUpdated, &args).await
}
