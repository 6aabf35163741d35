//! Backend API client implementation.
//!
//! This module provides the client for the generation backend. Every public
//! method performs exactly one HTTP request: there is no retry, caching or
//! batching. Authenticated methods check the session before building a
//! request, so a missing token never reaches the network.

use reqwest::{header, multipart, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, info, instrument, warn};

use super::error::{ApiError, Result};
use super::types::{
    AiOption, AiProvider, Issue, LoginRequest, LoginResponse, TaskGroup, TestCase, TestType,
};
use crate::session::Session;
use crate::validation::DocumentFile;

/// User agent sent with every request.
const USER_AGENT: &str = concat!("jiragen/", env!("CARGO_PKG_VERSION"));

/// The backend API client.
///
/// Cheap to clone: the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct BackendClient {
    /// The HTTP client.
    client: Client,
    /// The base URL of the backend, without trailing slash.
    base_url: String,
    /// The current session, if the user is signed in.
    session: Option<Session>,
}

impl BackendClient {
    /// Create a client for the given backend URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is empty or has no http(s) scheme, or if
    /// the HTTP client cannot be built.
    pub fn new(base_url: &str, session: Option<Session>) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    /// Replace the current session.
    pub fn set_session(&mut self, session: Option<Session>) {
        self.session = session;
    }

    /// Whether a usable bearer token is present.
    pub fn is_authenticated(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_valid)
    }

    // ------------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------------

    /// Exchange a Google identity credential for backend tokens.
    ///
    /// Calls `POST /api/auth/login`. This is the only unauthenticated call.
    #[instrument(skip_all)]
    pub async fn login(&self, google_token: &str) -> Result<LoginResponse> {
        info!("Signing in");
        let body = LoginRequest {
            google_token: google_token.to_string(),
        };
        let request = self
            .client
            .post(self.url("/api/auth/login"))
            .header(header::ACCEPT, "application/json")
            .json(&body);

        self.send(request).await.map_err(|e| {
            error!("Login failed: {}", e);
            e
        })
    }

    // ------------------------------------------------------------------------
    // Issues and generation
    // ------------------------------------------------------------------------

    /// List the AI providers the backend offers.
    ///
    /// Calls `GET /api/ia/select`.
    #[instrument(skip(self))]
    pub async fn list_ai_providers(&self) -> Result<Vec<AiOption>> {
        let options: Vec<AiOption> = self.get("/api/ia/select").await?;
        debug!("Backend offers {} AI providers", options.len());
        Ok(options)
    }

    /// Fetch an issue by key.
    ///
    /// Calls `GET /api/task?issueKey=`.
    #[instrument(skip(self), fields(issue_key = %key))]
    pub async fn get_issue(&self, key: &str) -> Result<Issue> {
        let path = format!("/api/task?issueKey={}", urlencoding::encode(key));
        let issue: Issue = self.get(&path).await?;
        debug!(issue_type = %issue.issue_type, "Fetched issue");
        Ok(issue)
    }

    /// Ask the backend to generate test cases for an issue.
    ///
    /// Calls `GET /api/test?issueKey=&testType=&iaType=`.
    #[instrument(skip(self), fields(issue_key = %key))]
    pub async fn generate_test_cases(
        &self,
        key: &str,
        test_type: TestType,
        provider: AiProvider,
    ) -> Result<Vec<TestCase>> {
        info!(test_type = ?test_type, provider = %provider, "Generating test cases");
        let path = format!(
            "/api/test?issueKey={}&testType={}&iaType={}",
            urlencoding::encode(key),
            test_type.query_value(),
            provider.id()
        );
        let cases: Vec<TestCase> = self.get(&path).await?;
        info!("Generated {} test cases", cases.len());
        Ok(cases)
    }

    /// Upload a requirements document and get generated task groups back.
    ///
    /// Calls `POST /api/generate-tasks` with a multipart body whose `pdf`
    /// part holds the file.
    #[instrument(skip(self, document), fields(file = %document.name))]
    pub async fn generate_tasks(&self, document: &DocumentFile) -> Result<Vec<TaskGroup>> {
        let token = self.bearer()?;
        info!(size = document.size, "Uploading document for task generation");

        let bytes = tokio::fs::read(&document.path).await?;
        let part = multipart::Part::bytes(bytes)
            .file_name(document.name.clone())
            .mime_str(&document.mime)?;
        let form = multipart::Form::new().part("pdf", part);

        let request = self
            .client
            .post(self.url("/api/generate-tasks"))
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json")
            .multipart(form);

        let groups: Vec<TaskGroup> = self.send(request).await?;
        info!("Generated {} task groups", groups.len());
        Ok(groups)
    }

    // ------------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------------

    /// Send selected test cases to the issue tracker.
    ///
    /// Calls `POST /api/post-test-cases?issueKey=`.
    #[instrument(skip(self, cases), fields(issue_key = %key, count = cases.len()))]
    pub async fn post_test_cases(&self, key: &str, cases: &[TestCase]) -> Result<()> {
        let token = self.bearer()?;
        if cases.is_empty() {
            return Err(ApiError::EmptyPayload("no test cases selected"));
        }

        let path = format!("/api/post-test-cases?issueKey={}", urlencoding::encode(key));
        let request = self.client.post(self.url(&path)).bearer_auth(token).json(cases);
        self.send_empty(request).await?;
        info!("Submitted test cases");
        Ok(())
    }

    /// Send selected task groups to the issue tracker.
    ///
    /// Calls `POST /api/post-tasks?projectKey=`.
    #[instrument(skip(self, groups), fields(project_key = %project_key, count = groups.len()))]
    pub async fn post_task_groups(&self, project_key: &str, groups: &[TaskGroup]) -> Result<()> {
        let token = self.bearer()?;
        if groups.is_empty() {
            return Err(ApiError::EmptyPayload("no task groups selected"));
        }

        let path = format!(
            "/api/post-tasks?projectKey={}",
            urlencoding::encode(project_key)
        );
        let request = self.client.post(self.url(&path)).bearer_auth(token).json(groups);
        self.send_empty(request).await?;
        info!("Submitted task groups");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Request helpers
    // ------------------------------------------------------------------------

    /// Build an absolute URL from a path beginning with `/`.
    pub(super) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// The bearer token, or `MissingToken`.
    pub(super) fn bearer(&self) -> Result<&str> {
        self.session
            .as_ref()
            .and_then(Session::access_token)
            .ok_or_else(|| {
                warn!("Request attempted without an access token");
                ApiError::MissingToken
            })
    }

    /// Perform an authenticated GET and parse the JSON body.
    pub(super) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let token = self.bearer()?;
        let request = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json");
        self.send(request).await
    }

    /// Perform an authenticated request with a JSON body and parse the reply.
    pub(super) async fn send_json<B, T>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let token = self.bearer()?;
        let request = self
            .client
            .request(method, self.url(path))
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json")
            .json(body);
        self.send(request).await
    }

    /// Send a request and parse a JSON success body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(|e| {
            error!("Request failed: {}", e);
            ApiError::Network(e)
        })?;
        let response = Self::check_status(response).await?;

        response.json::<T>().await.map_err(|e| {
            error!("Failed to parse response: {}", e);
            ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
        })
    }

    /// Send a request whose success body is ignored.
    async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        let response = request.send().await.map_err(|e| {
            error!("Request failed: {}", e);
            ApiError::Network(e)
        })?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// Turn a non-success response into an `ApiError::Server`.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        debug!(%url, "Error response body: {}", body);

        let err = ApiError::from_response(status, &body);
        error!(%url, status = status.as_u16(), "Backend error: {}", err);
        Err(err)
    }
}

/// Normalize the base URL by removing trailing slashes.
///
/// Rejects URLs without an http(s) scheme and warns on plain http to hosts
/// other than localhost.
fn normalize_base_url(url: &str) -> Result<String> {
    let url = url.trim().trim_end_matches('/');

    if url.is_empty() {
        return Err(ApiError::InvalidUrl("backend URL cannot be empty".to_string()));
    }

    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(ApiError::InvalidUrl(format!(
            "'{}' must start with http:// or https://",
            url
        )));
    }

    if url.starts_with("http://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
        warn!("Backend URL does not use HTTPS: {}. Tokens are sent in clear text.", url);
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A port nothing listens on; any request would fail with a network error.
    const UNREACHABLE: &str = "http://127.0.0.1:9";

    fn anonymous() -> BackendClient {
        BackendClient::new(UNREACHABLE, None).unwrap()
    }

    #[test]
    fn test_normalize_base_url_removes_trailing_slash() {
        assert_eq!(
            normalize_base_url("https://gen.example.com/").unwrap(),
            "https://gen.example.com"
        );
        assert_eq!(
            normalize_base_url("http://localhost:8080///").unwrap(),
            "http://localhost:8080"
        );
    }

    #[test]
    fn test_normalize_base_url_preserves_path() {
        assert_eq!(
            normalize_base_url("https://gen.example.com/proxy/").unwrap(),
            "https://gen.example.com/proxy"
        );
    }

    #[test]
    fn test_normalize_base_url_rejects_missing_scheme() {
        assert!(matches!(
            normalize_base_url("gen.example.com"),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(matches!(normalize_base_url("  "), Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn test_url_joins_path() {
        let client = anonymous();
        assert_eq!(client.url("/api/user/me"), "http://127.0.0.1:9/api/user/me");
    }

    #[test]
    fn test_is_authenticated() {
        let mut client = anonymous();
        assert!(!client.is_authenticated());
        client.set_session(Some(Session::new("", "")));
        assert!(!client.is_authenticated());
        client.set_session(Some(Session::new("token", "")));
        assert!(client.is_authenticated());
    }

    #[test]
    fn test_bearer_requires_token() {
        let client = anonymous();
        assert!(matches!(client.bearer(), Err(ApiError::MissingToken)));
    }

    #[tokio::test]
    async fn test_get_issue_without_token_fails_before_network() {
        let err = anonymous().get_issue("PIA-30").await.unwrap_err();
        assert!(matches!(err, ApiError::MissingToken));
    }

    #[tokio::test]
    async fn test_generate_test_cases_without_token() {
        let err = anonymous()
            .generate_test_cases("PIA-30", TestType::Web, AiProvider::Gemini)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingToken));
    }

    #[tokio::test]
    async fn test_post_test_cases_without_token() {
        let cases = vec![TestCase::default()];
        let err = anonymous().post_test_cases("PIA-30", &cases).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingToken));
    }

    #[tokio::test]
    async fn test_post_empty_test_cases_fails_before_network() {
        let client = BackendClient::new(UNREACHABLE, Some(Session::new("t", ""))).unwrap();
        let err = client.post_test_cases("PIA-30", &[]).await.unwrap_err();
        assert!(matches!(err, ApiError::EmptyPayload(_)));
    }

    #[tokio::test]
    async fn test_post_empty_task_groups_fails_before_network() {
        let client = BackendClient::new(UNREACHABLE, Some(Session::new("t", ""))).unwrap();
        let err = client.post_task_groups("PIA", &[]).await.unwrap_err();
        assert!(matches!(err, ApiError::EmptyPayload(_)));
    }

    #[tokio::test]
    async fn test_generate_tasks_without_token_does_not_read_file() {
        let document = DocumentFile {
            path: "/definitely/not/here.pdf".into(),
            name: "here.pdf".into(),
            mime: "application/pdf".into(),
            size: 10,
        };
        let err = anonymous().generate_tasks(&document).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingToken));
    }

    #[tokio::test]
    async fn test_transport_error_is_network() {
        let client = BackendClient::new(UNREACHABLE, Some(Session::new("t", ""))).unwrap();
        let err = client.get_issue("PIA-30").await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }

    #[test]
    fn test_list_ai_providers_without_token_blocking() {
        let result = tokio_test::block_on(anonymous().list_ai_providers());
        assert!(matches!(result, Err(ApiError::MissingToken)));
    }
}
