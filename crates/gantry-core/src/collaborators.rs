//! Trait boundary between the decision core and its side-effecting
//! collaborators. The runtime crate provides the real implementations;
//! tests substitute in-memory fakes.

use anyhow::Result;
use async_trait::async_trait;

use crate::context::EventContext;
use crate::modes::PreparedModeContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingComment {
    pub id: u64,
    pub author_login: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `BranchInfo` used across Gantry components.
pub struct BranchInfo {
    pub base_branch: String,
    /// Freshly created agent working branch; `None` when the agent works on
    /// an existing PR head directly.
    pub work_branch: Option<String>,
    pub current_branch: String,
}

#[derive(Debug, Clone, Default)]
pub struct EntityMetadata {
    pub title: String,
    pub body: String,
    pub author_login: String,
    pub state: String,
    /// PR head branch name, when the entity is a pull request.
    pub head_ref: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FetchedComment {
    pub author_login: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct ChangedFile {
    pub path: String,
    pub status: String,
    pub additions: u64,
    pub deletions: u64,
    pub sha: String,
}

#[derive(Debug, Clone, Default)]
/// Public struct `FetchedEventData` used across Gantry components.
pub struct FetchedEventData {
    pub default_branch: String,
    pub entity: Option<EntityMetadata>,
    pub comments: Vec<FetchedComment>,
    pub review_comments: Vec<FetchedComment>,
    pub changed_files: Vec<ChangedFile>,
    pub attachment_urls: Vec<String>,
}

#[async_trait]
/// Creates or refreshes the progress-tracking comment on the entity.
pub trait TrackingCommentClient: Send + Sync {
    async fn create_tracking_comment(&self, context: &EventContext) -> Result<TrackingComment>;
}

#[async_trait]
/// Resolves base/working/current branch names, creating the working branch
/// when one is needed. Runs after the tracking comment exists so the comment
/// author is available for downstream git identity.
pub trait BranchPlanner: Send + Sync {
    async fn plan_branch(
        &self,
        context: &EventContext,
        data: &FetchedEventData,
        tracking: &TrackingComment,
    ) -> Result<BranchInfo>;
}

#[async_trait]
/// Fetches entity metadata, comments, review data, and changed files.
pub trait EventDataFetcher: Send + Sync {
    async fn fetch(&self, context: &EventContext) -> Result<FetchedEventData>;
}

#[async_trait]
/// Consumes the mode-prepared context and fetched data to produce the agent
/// prompt.
pub trait PromptWriter: Send + Sync {
    async fn write_prompt(
        &self,
        prepared: &PreparedModeContext,
        data: &FetchedEventData,
    ) -> Result<()>;
}

#[async_trait]
/// Builds the tool-server configuration blob from resolved branches and the
/// composed allow list.
pub trait ToolServerConfigurator: Send + Sync {
    async fn build_config(
        &self,
        context: &EventContext,
        branches: &BranchInfo,
        comment_id: u64,
        allowed_tools: &[String],
    ) -> Result<String>;
}
