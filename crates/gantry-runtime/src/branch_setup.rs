use anyhow::Result;
use async_trait::async_trait;

use gantry_core::collaborators::{BranchInfo, BranchPlanner, FetchedEventData, TrackingComment};
use gantry_core::context::EventContext;

use crate::fs_util::current_unix_timestamp;
use crate::github_api_client::GithubApiClient;

/// Branch name for a fresh agent working branch: prefix, entity scope, and a
/// timestamp so repeated runs never collide.
pub fn work_branch_name(context: &EventContext, timestamp: u64) -> String {
    let prefix = context.inputs.branch_prefix.as_str();
    if !context.is_entity_event() {
        return format!("{prefix}run-{}-{timestamp}", context.run_id);
    }
    let scope = if context.is_pr { "pr" } else { "issue" };
    format!("{prefix}{scope}-{}-{timestamp}", context.entity_number)
}

pub struct ApiBranchPlanner {
    client: GithubApiClient,
}

impl ApiBranchPlanner {
    pub fn new(client: GithubApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BranchPlanner for ApiBranchPlanner {
    async fn plan_branch(
        &self,
        context: &EventContext,
        data: &FetchedEventData,
        tracking: &TrackingComment,
    ) -> Result<BranchInfo> {
        let base_branch = context
            .inputs
            .base_branch
            .clone()
            .unwrap_or_else(|| data.default_branch.clone());

        // Open PRs are worked on directly; everything else gets a fresh
        // branch off the base.
        if context.is_pr {
            if let Some(entity) = data.entity.as_ref() {
                if entity.state == "open" {
                    let head = entity
                        .head_ref
                        .clone()
                        .unwrap_or_else(|| base_branch.clone());
                    tracing::info!(branch = %head, "using open pull request head branch");
                    return Ok(BranchInfo {
                        base_branch,
                        work_branch: None,
                        current_branch: head,
                    });
                }
            }
        }

        let branch = work_branch_name(context, current_unix_timestamp());
        let sha = self.client.branch_sha(&base_branch).await?;
        self.client.create_branch(&branch, &sha).await?;
        tracing::info!(
            branch = %branch,
            base = %base_branch,
            comment_author = %tracking.author_login,
            "created agent working branch"
        );
        Ok(BranchInfo {
            base_branch,
            work_branch: Some(branch.clone()),
            current_branch: branch,
        })
    }
}
