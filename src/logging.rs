//! Logging configuration using the tracing ecosystem.
//!
//! Diagnostics go to standard error so standard output only carries the
//! run summary. The level comes from `RUST_LOG` when set, otherwise from
//! the config file's `debug` flag.

use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Default log filter if RUST_LOG is not set.
const DEFAULT_LOG_FILTER: &str = "jira_report=info,warn";

/// Log filter used when the config enables debug output.
const DEBUG_LOG_FILTER: &str = "jira_report=debug,warn";

/// Initialize the logging system.
///
/// # Log Levels
///
/// - `RUST_LOG=jira_report=debug` - per-request and per-page details
/// - `RUST_LOG=trace` - everything, including reqwest/hyper internals
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn init(debug: bool) -> Result<(), SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(debug)
                .with_line_number(debug),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "jira-report starting");
    Ok(())
}

fn default_filter(debug: bool) -> &'static str {
    if debug {
        DEBUG_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    }
}
