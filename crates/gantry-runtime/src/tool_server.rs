use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::json;

use gantry_core::collaborators::{BranchInfo, ToolServerConfigurator};
use gantry_core::context::EventContext;

/// Builds the tool-server (MCP) configuration blob the downstream agent step
/// consumes. The blob embeds resolved branches, the tracking comment id, and
/// the composed allow list.
pub struct McpConfigBuilder {
    github_token: String,
    api_base: String,
}

impl McpConfigBuilder {
    pub fn new(github_token: String, api_base: String) -> Self {
        Self {
            github_token,
            api_base,
        }
    }
}

#[async_trait]
impl ToolServerConfigurator for McpConfigBuilder {
    async fn build_config(
        &self,
        context: &EventContext,
        branches: &BranchInfo,
        comment_id: u64,
        allowed_tools: &[String],
    ) -> Result<String> {
        let config = json!({
            "mcpServers": {
                "github_comment": {
                    "command": "gantry-comment-server",
                    "env": {
                        "GITHUB_TOKEN": self.github_token,
                        "GITHUB_API_URL": self.api_base,
                        "REPO_OWNER": context.repository.owner,
                        "REPO_NAME": context.repository.name,
                        "COMMENT_ID": comment_id.to_string(),
                    }
                },
                "github": {
                    "command": "gantry-github-server",
                    "env": {
                        "GITHUB_TOKEN": self.github_token,
                        "GITHUB_API_URL": self.api_base,
                        "REPO_OWNER": context.repository.owner,
                        "REPO_NAME": context.repository.name,
                        "BASE_BRANCH": branches.base_branch,
                        "BRANCH_NAME": branches.current_branch,
                    }
                }
            },
            "allowedTools": allowed_tools,
        });
        serde_json::to_string(&config).context("failed to serialize tool-server config")
    }
}

#[cfg(test)]
mod tests {
    use super::McpConfigBuilder;
    use gantry_core::collaborators::{BranchInfo, ToolServerConfigurator};
    use gantry_core::context::{parse_event_context, ActionEnv};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    #[tokio::test]
    async fn functional_build_config_embeds_branches_comment_and_tools() {
        let context = parse_event_context(&ActionEnv::new(
            "issues",
            json!({"action": "opened", "issue": {"number": 2}}),
            HashMap::from([
                ("GITHUB_REPOSITORY".to_string(), "acme/widgets".to_string()),
                ("GITHUB_RUN_ID".to_string(), "1".to_string()),
                ("GITHUB_ACTOR".to_string(), "octocat".to_string()),
            ]),
        ))
        .expect("context");
        let builder = McpConfigBuilder::new(
            "secret-token".to_string(),
            "https://api.github.com".to_string(),
        );
        let blob = builder
            .build_config(
                &context,
                &BranchInfo {
                    base_branch: "main".to_string(),
                    work_branch: Some("claude/issue-2-7".to_string()),
                    current_branch: "claude/issue-2-7".to_string(),
                },
                321,
                &["Edit".to_string(), "Read".to_string()],
            )
            .await
            .expect("config");

        let parsed: Value = serde_json::from_str(&blob).expect("valid json");
        assert_eq!(
            parsed["mcpServers"]["github"]["env"]["BRANCH_NAME"],
            "claude/issue-2-7"
        );
        assert_eq!(
            parsed["mcpServers"]["github_comment"]["env"]["COMMENT_ID"],
            "321"
        );
        assert_eq!(parsed["allowedTools"][0], "Edit");
    }
}
