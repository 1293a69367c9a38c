//! HTTP session construction and retry policy.
//!
//! Builds the single `reqwest::Client` used for a report run, and describes
//! the bounded retry applied to transient server and rate-limit responses.

use std::time::Duration;

use reqwest::{header, Client, StatusCode};

use super::error::{ApiError, Result};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default maximum number of retries for transient failures.
pub const DEFAULT_MAX_RETRIES: u32 = 4;

/// Default backoff factor in milliseconds.
const DEFAULT_BACKOFF_MS: u64 = 600;

/// Upper bound for a server-supplied `Retry-After` delay.
const MAX_RETRY_AFTER_SECS: u64 = 60;

/// Status codes that are retried transparently.
const RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Bounded exponential-backoff retry for idempotent GET requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Zero disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for every following one.
    pub backoff: Duration,
    /// Status codes considered transient.
    pub statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
            statuses: RETRY_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Whether a response with this status should be retried.
    pub fn should_retry_status(&self, status: StatusCode) -> bool {
        self.statuses.contains(&status.as_u16())
    }

    /// Whether a transport error should be retried.
    pub fn should_retry_error(&self, error: &ApiError) -> bool {
        match error {
            ApiError::Network(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }

    /// Delay before retry number `attempt` (1-based).
    ///
    /// A numeric `Retry-After` header, when present, takes precedence.
    pub fn delay(&self, attempt: u32, retry_after: Option<&header::HeaderValue>) -> Duration {
        if let Some(secs) = retry_after
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            return Duration::from_secs(secs.min(MAX_RETRY_AFTER_SECS));
        }
        self.backoff
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// Options for building the HTTP client.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Verify TLS certificates. Only disable for self-signed test instances.
    pub verify_tls: bool,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Retry policy applied by the client.
    pub retry: RetryPolicy,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            verify_tls: true,
            user_agent: format!("jira-report/{}", env!("CARGO_PKG_VERSION")),
            retry: RetryPolicy::default(),
        }
    }
}

/// Build the HTTP client with the given settings.
pub fn build_http_client(options: &SessionOptions) -> Result<Client> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );

    Client::builder()
        .timeout(options.timeout)
        .user_agent(options.user_agent.as_str())
        .default_headers(headers)
        .danger_accept_invalid_certs(!options.verify_tls)
        .build()
        .map_err(ApiError::Network)
}
