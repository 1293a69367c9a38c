//! JIRA API client and types.
//!
//! This module provides the interface for communicating with the JIRA REST
//! and Agile APIs.

mod agile;
mod auth;
mod client;
pub mod error;
mod session;
pub mod types;
mod version;

pub use agile::pick_preferred_board;
pub use auth::{Auth, AuthScheme};
pub use client::{JiraClient, SearchQuery};
pub use error::ApiError;
pub use session::{build_http_client, RetryPolicy, SessionOptions};
pub use types::{Board, Issue, SearchResult, Sprint};
pub use version::ApiVersions;
