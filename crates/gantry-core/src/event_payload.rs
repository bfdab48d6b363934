use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
/// Public struct `GithubUser` used across Gantry components.
pub struct GithubUser {
    #[serde(default)]
    pub login: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GithubLabel {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Public struct `GithubIssue` used across Gantry components.
pub struct GithubIssue {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: GithubUser,
    /// Present when the issue is the issue-side view of a pull request.
    #[serde(default)]
    pub pull_request: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GithubComment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: GithubUser,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GithubGitRef {
    #[serde(rename = "ref", default)]
    pub ref_name: String,
    #[serde(default)]
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Public struct `GithubPullRequest` used across Gantry components.
pub struct GithubPullRequest {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: GithubUser,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub head: Option<GithubGitRef>,
    #[serde(default)]
    pub base: Option<GithubGitRef>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GithubReview {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: GithubUser,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IssuesPayload {
    pub issue: GithubIssue,
    #[serde(default)]
    pub assignee: Option<GithubUser>,
    #[serde(default)]
    pub label: Option<GithubLabel>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IssueCommentPayload {
    pub issue: GithubIssue,
    pub comment: GithubComment,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PullRequestPayload {
    pub pull_request: GithubPullRequest,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PullRequestReviewPayload {
    pub pull_request: GithubPullRequest,
    #[serde(default)]
    pub review: GithubReview,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PullRequestReviewCommentPayload {
    pub pull_request: GithubPullRequest,
    pub comment: GithubComment,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WorkflowDispatchPayload {
    #[serde(default)]
    pub inputs: Option<Value>,
}

/// Synthesized for timer triggers; `schedule` events are not webhooks and
/// carry only the cron expression that fired.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SchedulePayload {
    #[serde(default)]
    pub schedule: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Enumerates supported `EventPayload` values.
pub enum EventPayload {
    Issues(IssuesPayload),
    IssueComment(IssueCommentPayload),
    PullRequest(PullRequestPayload),
    PullRequestReview(PullRequestReviewPayload),
    PullRequestReviewComment(PullRequestReviewCommentPayload),
    WorkflowDispatch(WorkflowDispatchPayload),
    Schedule(SchedulePayload),
}

impl EventPayload {
    /// Parses the shape matching `event_name`, failing for any event kind
    /// outside the supported set.
    pub fn parse(event_name: &str, value: Value) -> Result<Self> {
        let payload = match event_name {
            "issues" => Self::Issues(
                serde_json::from_value(value).context("malformed issues payload")?,
            ),
            "issue_comment" => Self::IssueComment(
                serde_json::from_value(value).context("malformed issue_comment payload")?,
            ),
            "pull_request" => Self::PullRequest(
                serde_json::from_value(value).context("malformed pull_request payload")?,
            ),
            "pull_request_review" => Self::PullRequestReview(
                serde_json::from_value(value).context("malformed pull_request_review payload")?,
            ),
            "pull_request_review_comment" => Self::PullRequestReviewComment(
                serde_json::from_value(value)
                    .context("malformed pull_request_review_comment payload")?,
            ),
            "workflow_dispatch" => Self::WorkflowDispatch(
                serde_json::from_value(value).context("malformed workflow_dispatch payload")?,
            ),
            "schedule" => Self::Schedule(
                serde_json::from_value(value).context("malformed schedule payload")?,
            ),
            other => bail!("unsupported event type: {other}"),
        };
        Ok(payload)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Issues(_) => "issues",
            Self::IssueComment(_) => "issue_comment",
            Self::PullRequest(_) => "pull_request",
            Self::PullRequestReview(_) => "pull_request_review",
            Self::PullRequestReviewComment(_) => "pull_request_review_comment",
            Self::WorkflowDispatch(_) => "workflow_dispatch",
            Self::Schedule(_) => "schedule",
        }
    }

    pub fn issues(&self) -> Option<&IssuesPayload> {
        match self {
            Self::Issues(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn issue_comment(&self) -> Option<&IssueCommentPayload> {
        match self {
            Self::IssueComment(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn pull_request(&self) -> Option<&PullRequestPayload> {
        match self {
            Self::PullRequest(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn pull_request_review(&self) -> Option<&PullRequestReviewPayload> {
        match self {
            Self::PullRequestReview(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn pull_request_review_comment(&self) -> Option<&PullRequestReviewCommentPayload> {
        match self {
            Self::PullRequestReviewComment(payload) => Some(payload),
            _ => None,
        }
    }
}
