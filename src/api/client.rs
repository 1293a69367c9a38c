//! JIRA API client implementation.
//!
//! This module provides the client used by the report generators. It handles
//! authentication, response validation (status, content type, JSON decoding),
//! transparent retry of transient failures, paginated JQL search and API
//! version fallback.

use reqwest::{header, Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::auth::Auth;
use super::error::{snippet, ApiError, Result};
use super::session::{build_http_client, RetryPolicy, SessionOptions};
use super::types::{SearchPage, SearchResult};
use super::version::ApiVersions;

/// A JQL search request.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// The JQL query string.
    pub jql: String,
    /// Fields to return for every issue. Empty means the server default.
    pub fields: Vec<String>,
    /// Requested page size. The server may cap it.
    pub page_size: u32,
}

impl SearchQuery {
    pub fn new(jql: impl Into<String>, fields: Vec<String>, page_size: u32) -> Self {
        Self {
            jql: jql.into(),
            fields,
            page_size,
        }
    }
}

/// The JIRA API client.
///
/// Issues one request at a time; every call is awaited to completion before
/// the next one is sent.
#[derive(Debug)]
pub struct JiraClient {
    /// The HTTP client.
    client: Client,
    /// The base URL for the JIRA instance, without trailing slash.
    base_url: String,
    /// Authentication credentials.
    auth: Auth,
    /// Retry policy for transient failures.
    retry: RetryPolicy,
}

impl JiraClient {
    /// Create a new JIRA client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not a valid URL or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, auth: Auth, options: &SessionOptions) -> Result<Self> {
        let base_url = normalize_base_url(base_url);
        Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = build_http_client(options)?;
        debug!(base_url = %base_url, scheme = ?auth.scheme(), "JIRA client created");

        Ok(Self {
            client,
            base_url,
            auth,
            retry: options.retry.clone(),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join an API path onto the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Search with version fallback.
    ///
    /// Tries each version in order and returns the first complete result.
    /// When every version fails, the last error is returned.
    #[instrument(skip(self, query, versions), fields(jql = %query.jql, versions = %versions))]
    pub async fn search(&self, query: &SearchQuery, versions: &ApiVersions) -> Result<SearchResult> {
        let mut last_error = None;

        for version in versions.iter() {
            debug!("Trying JIRA REST API v{}", version);
            match self.search_all(version, query).await {
                Ok(result) => {
                    info!(
                        version,
                        count = result.issues.len(),
                        "Search completed"
                    );
                    return Ok(result);
                }
                Err(e) => {
                    warn!(version, error = %e, "Search failed on API version");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(ApiError::NoVersions))
    }

    /// Fetch every page of a search against one API version.
    ///
    /// Stops when `startAt + maxResults >= total` or a page comes back empty.
    /// The offset advances by the page size the server reports, so server-side
    /// capping of `maxResults` is honored.
    pub async fn search_all(&self, version: &str, query: &SearchQuery) -> Result<SearchResult> {
        let mut issues = Vec::new();
        let mut start_at = 0u32;

        loop {
            let page = self.search_page(version, query, start_at).await?;
            let page_count = page.issues.len() as u32;
            let page_start = page.start_at.unwrap_or(start_at);
            let step = match page.max_results.unwrap_or(query.page_size) {
                0 => page_count,
                n => n,
            };

            issues.extend(page.issues);
            let total = page.total.unwrap_or(issues.len() as u32);

            debug!(
                start_at = page_start,
                max_results = step,
                page_count,
                total,
                "Page"
            );

            if page_count == 0 || page_start.saturating_add(step) >= total {
                return Ok(SearchResult {
                    api_version: version.to_string(),
                    total,
                    issues,
                });
            }
            start_at = page_start + step;
        }
    }

    /// Fetch a single page of search results.
    ///
    /// Calls `GET /rest/api/{version}/search`.
    pub async fn search_page(
        &self,
        version: &str,
        query: &SearchQuery,
        start_at: u32,
    ) -> Result<SearchPage> {
        let mut url = format!(
            "{}/rest/api/{}/search?jql={}&startAt={}&maxResults={}",
            self.base_url,
            version,
            urlencoding::encode(&query.jql),
            start_at,
            query.page_size
        );
        if !query.fields.is_empty() {
            url.push_str("&fields=");
            url.push_str(&urlencoding::encode(&query.fields.join(",")));
        }

        self.get_json(&url).await
    }

    /// Perform a GET request and decode the JSON body.
    ///
    /// Transient statuses and connection failures are retried according to
    /// the client's [`RetryPolicy`].
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let url = Url::parse(url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", url, e)))?;
        let mut attempt = 0u32;

        loop {
            debug!(url = %url, attempt = attempt + 1, "GET");
            let result = self
                .client
                .get(url.clone())
                .header(header::AUTHORIZATION, self.auth.header_value())
                .send()
                .await
                .map_err(ApiError::Network);

            match result {
                Ok(response)
                    if attempt < self.retry.max_retries
                        && self.retry.should_retry_status(response.status()) =>
                {
                    attempt += 1;
                    let delay = self
                        .retry
                        .delay(attempt, response.headers().get(header::RETRY_AFTER));
                    warn!(
                        status = response.status().as_u16(),
                        "Transient response (retry {}/{}), retrying in {}ms",
                        attempt,
                        self.retry.max_retries,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Ok(response) => return decode_response(&url, response).await,
                Err(e) if attempt < self.retry.max_retries && self.retry.should_retry_error(&e) => {
                    attempt += 1;
                    let delay = self.retry.delay(attempt, None);
                    warn!(
                        "Request failed (retry {}/{}), retrying in {}ms: {}",
                        attempt,
                        self.retry.max_retries,
                        delay.as_millis(),
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Validate a response and decode its JSON body.
///
/// Any status of 400 or above is an error; so is a non-JSON content type,
/// which usually means an SSO or login page answered instead of the API.
async fn decode_response<T: DeserializeOwned>(requested: &Url, response: Response) -> Result<T> {
    let status = response.status();
    let final_url = response.url().clone();
    let redirected = final_url != *requested;
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    debug!(
        status = status.as_u16(),
        content_type = %content_type,
        redirected,
        final_url = %final_url,
        "Response"
    );

    if status.as_u16() >= 400 {
        let headers = format!("{:?}", response.headers());
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::HttpStatus {
            status: status.as_u16(),
            url: requested.to_string(),
            headers,
            body: snippet(&body),
        });
    }

    let body = response.text().await?;

    if !content_type.to_ascii_lowercase().contains("application/json") {
        return Err(ApiError::ContentTypeMismatch {
            content_type,
            url: final_url.to_string(),
            redirected,
            snippet: snippet(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| ApiError::DecodeFailure {
        url: final_url.to_string(),
        message: e.to_string(),
        snippet: snippet(&body),
    })
}

/// Normalize the base URL by trimming whitespace and trailing slashes.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');

    if !url.starts_with("https://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
        warn!("URL does not use HTTPS: {}. This is insecure for production use.", url);
    }

    url.to_string()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{header as header_eq, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn test_client(uri: &str) -> JiraClient {
        let options = SessionOptions {
            retry: RetryPolicy::none(),
            ..SessionOptions::default()
        };
        JiraClient::new(uri, Auth::basic("test@example.com", "test_token"), &options).unwrap()
    }

    fn issue(key: &str) -> serde_json::Value {
        json!({ "key": key, "fields": { "summary": format!("Summary of {}", key) } })
    }

    fn page(start_at: u32, max_results: u32, total: u32, keys: &[&str]) -> serde_json::Value {
        json!({
            "startAt": start_at,
            "maxResults": max_results,
            "total": total,
            "issues": keys.iter().map(|k| issue(k)).collect::<Vec<_>>(),
        })
    }

    fn query() -> SearchQuery {
        SearchQuery::new("project = TEST", vec!["summary".to_string()], 5)
    }

    #[test]
    fn test_normalize_base_url_removes_trailing_slash() {
        assert_eq!(
            normalize_base_url("https://company.atlassian.net/"),
            "https://company.atlassian.net"
        );
        assert_eq!(
            normalize_base_url(" https://company.atlassian.net/jira/// "),
            "https://company.atlassian.net/jira"
        );
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let result = JiraClient::new(
            "not a url",
            Auth::bearer("t"),
            &SessionOptions::default(),
        );
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_pagination_concatenates_decreasing_pages() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/search"))
            .and(query_param("startAt", "0"))
            .and(query_param("jql", "project = TEST"))
            .and(query_param("fields", "summary"))
            .and(header_eq(
                "Authorization",
                "Basic dGVzdEBleGFtcGxlLmNvbTp0ZXN0X3Rva2Vu",
            ))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(page(0, 5, 10, &["T-1", "T-2", "T-3", "T-4", "T-5"])),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/search"))
            .and(query_param("startAt", "5"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(page(5, 3, 10, &["T-6", "T-7", "T-8"])),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/search"))
            .and(query_param("startAt", "8"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(page(8, 2, 10, &["T-9", "T-10"])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.search_all("3", &query()).await.unwrap();

        let keys: Vec<_> = result.issues.iter().map(|i| i.key.as_str()).collect();
        let expected: Vec<String> = (1..=10).map(|n| format!("T-{}", n)).collect();
        assert_eq!(keys, expected);
        assert_eq!(result.total, 10);
        assert_eq!(result.api_version, "3");
    }

    #[tokio::test]
    async fn test_pagination_stops_on_empty_page() {
        let server = MockServer::start().await;

        // Server claims 100 results but runs dry after the first page.
        Mock::given(method("GET"))
            .and(path("/rest/api/2/search"))
            .and(query_param("startAt", "0"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(page(0, 2, 100, &["A-1", "A-2"])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/search"))
            .and(query_param("startAt", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(2, 2, 100, &[])))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.search_all("2", &query()).await.unwrap();
        assert_eq!(result.issues.len(), 2);
    }

    #[tokio::test]
    async fn test_pagination_without_metadata_is_single_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "issues": [issue("B-1"), issue("B-2")] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.search_all("3", &query()).await.unwrap();
        assert_eq!(result.issues.len(), 2);
        assert_eq!(result.total, 2);
    }

    #[tokio::test]
    async fn test_version_fallback_hides_first_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/search"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no v3 here"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(0, 5, 1, &["V2-1"])))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client
            .search(&query(), &ApiVersions::from_hint("auto"))
            .await
            .unwrap();

        assert_eq!(result.api_version, "2");
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].key, "V2-1");
    }

    #[tokio::test]
    async fn test_all_versions_failing_returns_last_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/search"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad jql"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/search"))
            .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .search(&query(), &ApiVersions::from_hint("auto"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("/rest/api/2/search"));
    }

    #[tokio::test]
    async fn test_empty_version_list() {
        let client = test_client("http://localhost:1");
        let err = client
            .search(&query(), &ApiVersions::new(vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NoVersions));
    }

    #[tokio::test]
    async fn test_status_404_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/search"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Project not found"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.search_all("3", &query()).await.unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("Project not found"));
        assert!(matches!(err, ApiError::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_login_redirect_is_auth_hint_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/search"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/login", server.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html><body>Sign in</body></html>", "text/html"),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.search_all("3", &query()).await.unwrap_err();

        assert!(err.is_auth_redirect());
        let msg = err.to_string();
        assert!(msg.contains("text/html"));
        assert!(msg.contains("SSO/login"));
        assert!(msg.contains("Sign in"));
    }

    #[tokio::test]
    async fn test_html_without_redirect_is_content_type_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/search"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.search_all("3", &query()).await.unwrap_err();

        match err {
            ApiError::ContentTypeMismatch {
                content_type,
                redirected,
                ..
            } => {
                assert_eq!(content_type, "text/html");
                assert!(!redirected);
            }
            other => panic!("Expected ContentTypeMismatch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_decode_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("{\"issues\": [", "application/json"),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.search_all("3", &query()).await.unwrap_err();

        match err {
            ApiError::DecodeFailure { snippet, .. } => assert!(snippet.contains("issues")),
            other => panic!("Expected DecodeFailure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transient_status_is_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/search"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(0, 5, 1, &["R-1"])))
            .expect(1)
            .mount(&server)
            .await;

        let options = SessionOptions {
            retry: RetryPolicy {
                backoff: Duration::from_millis(1),
                ..RetryPolicy::default()
            },
            ..SessionOptions::default()
        };
        let client = JiraClient::new(&server.uri(), Auth::bearer("pat"), &options).unwrap();
        let result = client.search_all("3", &query()).await.unwrap();
        assert_eq!(result.issues[0].key, "R-1");
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/search"))
            .respond_with(ResponseTemplate::new(502))
            .expect(3)
            .mount(&server)
            .await;

        let options = SessionOptions {
            retry: RetryPolicy {
                max_retries: 2,
                backoff: Duration::from_millis(1),
                ..RetryPolicy::default()
            },
            ..SessionOptions::default()
        };
        let client = JiraClient::new(&server.uri(), Auth::bearer("pat"), &options).unwrap();
        let err = client.search_all("3", &query()).await.unwrap_err();
        assert_eq!(err.status(), Some(502));
    }
}
