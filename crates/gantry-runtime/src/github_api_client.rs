use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use gantry_core::context::RepoRef;

/// Retry policy for GitHub REST calls. Rate limits and server errors are
/// retried with exponential backoff; a parseable `Retry-After` header
/// overrides the computed delay.
#[derive(Debug, Clone)]
struct RetryPolicy {
    max_attempts: usize,
    base_delay: Duration,
}

impl RetryPolicy {
    const BACKOFF_CAP: Duration = Duration::from_secs(20);

    fn new(max_attempts: usize, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_millis(base_delay_ms.max(1)),
        }
    }

    fn retries_status(&self, attempt: usize, status: reqwest::StatusCode) -> bool {
        attempt < self.max_attempts
            && (status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error())
    }

    fn retries_error(&self, attempt: usize, error: &reqwest::Error) -> bool {
        attempt < self.max_attempts
            && (error.is_timeout() || error.is_connect() || error.is_request())
    }

    /// Delay before the next attempt, clamped between the base delay and
    /// `BACKOFF_CAP` either way.
    fn backoff(&self, attempt: usize, headers: Option<&reqwest::header::HeaderMap>) -> Duration {
        let advised = headers
            .and_then(|headers| headers.get(reqwest::header::RETRY_AFTER))
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let delay = advised.unwrap_or_else(|| {
            let doublings = attempt.saturating_sub(1).min(16) as u32;
            self.base_delay.saturating_mul(1_u32 << doublings)
        });
        let floor = self.base_delay.min(Self::BACKOFF_CAP);
        delay.clamp(floor, Self::BACKOFF_CAP)
    }
}

/// First chunk of an error response body, kept short enough for log lines.
fn body_snippet(body: &str) -> String {
    const LIMIT: usize = 600;
    match body.char_indices().nth(LIMIT) {
        None => body.to_string(),
        Some((at, _)) => format!("{} [truncated]", &body[..at]),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoMetadataResponse {
    pub default_branch: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserResponse {
    #[serde(default)]
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueResponse {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: UserResponse,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BranchRefResponse {
    #[serde(rename = "ref", default)]
    pub ref_name: String,
    #[serde(default)]
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestResponse {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: UserResponse,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub head: BranchRefResponse,
    #[serde(default)]
    pub base: BranchRefResponse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentResponse {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: UserResponse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullFileResponse {
    pub filename: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
struct GitRefObjectResponse {
    object: GitObjectResponse,
}

#[derive(Debug, Clone, Deserialize)]
struct GitObjectResponse {
    sha: String,
}

/// Thin GitHub REST client with bounded retry. One instance per invocation,
/// scoped to the triggering repository.
#[derive(Clone)]
pub struct GithubApiClient {
    http: reqwest::Client,
    api_base: String,
    repo: RepoRef,
    retry: RetryPolicy,
}

impl GithubApiClient {
    pub fn new(
        api_base: String,
        token: String,
        repo: RepoRef,
        request_timeout_ms: u64,
        retry_max_attempts: usize,
        retry_base_delay_ms: u64,
    ) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("gantry-event-gate"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            reqwest::header::HeaderValue::from_static("2022-11-28"),
        );
        let auth_header = format!("Bearer {}", token.trim());
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&auth_header)
                .context("invalid github authorization header")?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()
            .context("failed to create github api client")?;
        Ok(Self {
            http: client,
            api_base: api_base.trim_end_matches('/').to_string(),
            repo,
            retry: RetryPolicy::new(retry_max_attempts, retry_base_delay_ms),
        })
    }

    fn repo_url(&self, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.api_base, self.repo.owner, self.repo.name, suffix
        )
    }

    pub async fn repo_metadata(&self) -> Result<RepoMetadataResponse> {
        self.request_json("fetch repository metadata", || {
            self.http.get(self.repo_url(""))
        })
        .await
    }

    pub async fn issue(&self, number: u64) -> Result<IssueResponse> {
        self.request_json("fetch issue", || {
            self.http.get(self.repo_url(&format!("/issues/{number}")))
        })
        .await
    }

    pub async fn pull_request(&self, number: u64) -> Result<PullRequestResponse> {
        self.request_json("fetch pull request", || {
            self.http.get(self.repo_url(&format!("/pulls/{number}")))
        })
        .await
    }

    pub async fn issue_comments(&self, number: u64) -> Result<Vec<CommentResponse>> {
        self.paginated(&format!("/issues/{number}/comments"), "list issue comments")
            .await
    }

    pub async fn review_comments(&self, number: u64) -> Result<Vec<CommentResponse>> {
        self.paginated(&format!("/pulls/{number}/comments"), "list review comments")
            .await
    }

    pub async fn changed_files(&self, number: u64) -> Result<Vec<PullFileResponse>> {
        self.paginated(&format!("/pulls/{number}/files"), "list changed files")
            .await
    }

    pub async fn create_issue_comment(&self, number: u64, body: &str) -> Result<CommentResponse> {
        let payload = json!({ "body": body });
        self.request_json("create issue comment", || {
            self.http
                .post(self.repo_url(&format!("/issues/{number}/comments")))
                .json(&payload)
        })
        .await
    }

    pub async fn update_issue_comment(
        &self,
        comment_id: u64,
        body: &str,
    ) -> Result<CommentResponse> {
        let payload = json!({ "body": body });
        self.request_json("update issue comment", || {
            self.http
                .patch(self.repo_url(&format!("/issues/comments/{comment_id}")))
                .json(&payload)
        })
        .await
    }

    /// Head commit sha of a branch.
    pub async fn branch_sha(&self, branch: &str) -> Result<String> {
        let reference: GitRefObjectResponse = self
            .request_json("resolve branch ref", || {
                self.http
                    .get(self.repo_url(&format!("/git/ref/heads/{branch}")))
            })
            .await?;
        Ok(reference.object.sha)
    }

    pub async fn create_branch(&self, branch: &str, sha: &str) -> Result<()> {
        let payload = json!({ "ref": format!("refs/heads/{branch}"), "sha": sha });
        let _: serde_json::Value = self
            .request_json("create branch ref", || {
                self.http.post(self.repo_url("/git/refs")).json(&payload)
            })
            .await?;
        Ok(())
    }

    async fn paginated<T: DeserializeOwned>(
        &self,
        suffix: &str,
        operation: &str,
    ) -> Result<Vec<T>> {
        let mut page = 1_u32;
        let mut rows = Vec::new();
        loop {
            let page_value = page.to_string();
            let url = self.repo_url(suffix);
            let chunk: Vec<T> = self
                .request_json(operation, || {
                    self.http
                        .get(url.as_str())
                        .query(&[("per_page", "100"), ("page", page_value.as_str())])
                })
                .await?;
            let chunk_len = chunk.len();
            rows.extend(chunk);
            if chunk_len < 100 {
                break;
            }
            page = page.saturating_add(1);
        }
        Ok(rows)
    }

    async fn request_json<T, F>(&self, operation: &str, mut request_builder: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: FnMut() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0_usize;
        loop {
            attempt = attempt.saturating_add(1);
            let response = request_builder().send().await;
            match response {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let parsed = response
                            .json::<T>()
                            .await
                            .with_context(|| format!("failed to decode github {operation}"))?;
                        return Ok(parsed);
                    }

                    if self.retry.retries_status(attempt, status) {
                        let delay = self.retry.backoff(attempt, Some(response.headers()));
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    let body = response.text().await.unwrap_or_default();
                    bail!(
                        "github api {operation} failed with status {}: {}",
                        status.as_u16(),
                        body_snippet(&body)
                    );
                }
                Err(error) => {
                    if self.retry.retries_error(attempt, &error) {
                        tokio::time::sleep(self.retry.backoff(attempt, None)).await;
                        continue;
                    }
                    return Err(error)
                        .with_context(|| format!("github api {operation} request failed"));
                }
            }
        }
    }
}
