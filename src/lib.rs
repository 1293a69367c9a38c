//! jira-report - JSON and HTML reports from the JIRA REST API
//!
//! Two reports are provided: issues updated in the last N days, and the
//! status of a sprint aggregated by status, status category and type.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod render;
pub mod report;
