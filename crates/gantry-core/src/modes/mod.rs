//! Mode contract and orchestration shared by the mode variants.

use anyhow::Result;
use async_trait::async_trait;

use crate::collaborators::{
    BranchInfo, BranchPlanner, EventDataFetcher, PromptWriter, ToolServerConfigurator,
    TrackingCommentClient,
};
use crate::context::EventContext;

pub mod registry;
pub mod review;
pub mod tag;

/// Editing tools every engaged run receives before mode- and user-supplied
/// additions.
pub const BASE_ALLOWED_TOOLS: &[&str] = &[
    "Edit",
    "MultiEdit",
    "Glob",
    "Grep",
    "LS",
    "Read",
    "Write",
];
/// Advisory deny list handed to the downstream execution step.
pub const BASE_DISALLOWED_TOOLS: &[&str] = &["WebSearch", "WebFetch"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeRunData {
    pub comment_id: Option<u64>,
    pub base_branch: Option<String>,
    pub work_branch: Option<String>,
}

/// The reduced, mode-specific record handed to prompt construction. Never
/// mutated after creation.
#[derive(Debug, Clone)]
pub struct PreparedModeContext {
    pub mode: String,
    pub context: EventContext,
    pub comment_id: Option<u64>,
    pub base_branch: Option<String>,
    pub work_branch: Option<String>,
}

/// Collaborator handles a mode's `prepare` entry point orchestrates over.
pub struct ModeOptions<'a> {
    pub context: &'a EventContext,
    pub comments: &'a dyn TrackingCommentClient,
    pub branches: &'a dyn BranchPlanner,
    pub fetcher: &'a dyn EventDataFetcher,
    pub prompts: &'a dyn PromptWriter,
    pub tool_server: &'a dyn ToolServerConfigurator,
}

#[derive(Debug, Clone)]
/// Public struct `ModeResult` used across Gantry components.
pub struct ModeResult {
    pub comment_id: u64,
    pub branch_info: BranchInfo,
    pub tool_server_config: String,
    pub allowed_tools: Vec<String>,
    pub disallowed_tools: Vec<String>,
}

#[async_trait]
/// Trait contract for mode behavior. `should_trigger` and `prepare_context`
/// are pure; `prepare` is the only side-effecting surface and belongs at the
/// collaborator boundary.
pub trait Mode: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn should_trigger(&self, context: &EventContext) -> bool;
    fn prepare_context(
        &self,
        context: &EventContext,
        run_data: Option<ModeRunData>,
    ) -> PreparedModeContext;
    fn allowed_tools(&self) -> Vec<String>;
    fn disallowed_tools(&self) -> Vec<String>;
    fn creates_tracking_comment(&self) -> bool;
    async fn prepare(&self, options: ModeOptions<'_>) -> Result<ModeResult>;
}

pub(crate) fn build_prepared_context(
    mode: &str,
    context: &EventContext,
    run_data: Option<ModeRunData>,
) -> PreparedModeContext {
    let run_data = run_data.unwrap_or_default();
    PreparedModeContext {
        mode: mode.to_string(),
        context: context.clone(),
        comment_id: run_data.comment_id,
        base_branch: run_data.base_branch,
        work_branch: run_data.work_branch,
    }
}

/// Base editing tools, then mode additions, then user-supplied entries.
pub fn compose_allowed_tools(mode: &dyn Mode, context: &EventContext) -> Vec<String> {
    BASE_ALLOWED_TOOLS
        .iter()
        .map(ToString::to_string)
        .chain(mode.allowed_tools())
        .chain(context.inputs.allowed_tools.iter().cloned())
        .collect()
}

pub fn compose_disallowed_tools(mode: &dyn Mode, context: &EventContext) -> Vec<String> {
    BASE_DISALLOWED_TOOLS
        .iter()
        .map(ToString::to_string)
        .chain(mode.disallowed_tools())
        .chain(context.inputs.disallowed_tools.iter().cloned())
        .collect()
}

/// Shared `prepare` flow. Ordering is significant: the tracking comment must
/// exist before branch planning reads its author, and branch planning must
/// finish before the prompt is written.
pub async fn run_prepare(mode: &dyn Mode, options: ModeOptions<'_>) -> Result<ModeResult> {
    let context = options.context;
    let tracking = options.comments.create_tracking_comment(context).await?;
    let fetched = options.fetcher.fetch(context).await?;
    let branch_info = options
        .branches
        .plan_branch(context, &fetched, &tracking)
        .await?;

    let prepared = mode.prepare_context(
        context,
        Some(ModeRunData {
            comment_id: Some(tracking.id),
            base_branch: Some(branch_info.base_branch.clone()),
            work_branch: branch_info.work_branch.clone(),
        }),
    );
    options.prompts.write_prompt(&prepared, &fetched).await?;

    let allowed_tools = compose_allowed_tools(mode, context);
    let disallowed_tools = compose_disallowed_tools(mode, context);
    let tool_server_config = options
        .tool_server
        .build_config(context, &branch_info, tracking.id, &allowed_tools)
        .await?;

    Ok(ModeResult {
        comment_id: tracking.id,
        branch_info,
        tool_server_config,
        allowed_tools,
        disallowed_tools,
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use anyhow::{bail, Result};
    use async_trait::async_trait;

    use crate::collaborators::{
        BranchInfo, BranchPlanner, EventDataFetcher, FetchedEventData, PromptWriter,
        ToolServerConfigurator, TrackingComment, TrackingCommentClient,
    };
    use crate::context::{parse_event_context, ActionEnv, EventContext};
    use crate::modes::PreparedModeContext;
    use serde_json::Value;
    use std::collections::HashMap;

    pub(crate) fn context_for(
        event_name: &str,
        payload: Value,
        extra: &[(&str, &str)],
    ) -> EventContext {
        let mut vars = HashMap::from([
            ("GITHUB_REPOSITORY".to_string(), "acme/widgets".to_string()),
            ("GITHUB_RUN_ID".to_string(), "77".to_string()),
            ("GITHUB_ACTOR".to_string(), "octocat".to_string()),
        ]);
        for (key, value) in extra {
            vars.insert(key.to_string(), value.to_string());
        }
        parse_event_context(&ActionEnv::new(event_name, payload, vars)).expect("context")
    }

    /// Records collaborator call order and hands back canned results.
    #[derive(Default)]
    pub(crate) struct FakeCollaborators {
        pub(crate) calls: Mutex<Vec<&'static str>>,
        pub(crate) fail_comment: bool,
        pub(crate) prompts: Mutex<Vec<PreparedModeContext>>,
    }

    #[async_trait]
    impl TrackingCommentClient for FakeCollaborators {
        async fn create_tracking_comment(
            &self,
            _context: &EventContext,
        ) -> Result<TrackingComment> {
            self.calls.lock().unwrap().push("comment");
            if self.fail_comment {
                bail!("comment creation refused");
            }
            Ok(TrackingComment {
                id: 4242,
                author_login: "gantry-bot".to_string(),
            })
        }
    }

    #[async_trait]
    impl EventDataFetcher for FakeCollaborators {
        async fn fetch(&self, _context: &EventContext) -> Result<FetchedEventData> {
            self.calls.lock().unwrap().push("fetch");
            Ok(FetchedEventData {
                default_branch: "main".to_string(),
                ..Default::default()
            })
        }
    }

    #[async_trait]
    impl BranchPlanner for FakeCollaborators {
        async fn plan_branch(
            &self,
            _context: &EventContext,
            data: &FetchedEventData,
            _tracking: &TrackingComment,
        ) -> Result<BranchInfo> {
            self.calls.lock().unwrap().push("branch");
            Ok(BranchInfo {
                base_branch: data.default_branch.clone(),
                work_branch: Some("claude/issue-1-1700000000".to_string()),
                current_branch: "claude/issue-1-1700000000".to_string(),
            })
        }
    }

    #[async_trait]
    impl PromptWriter for FakeCollaborators {
        async fn write_prompt(
            &self,
            prepared: &PreparedModeContext,
            _data: &FetchedEventData,
        ) -> Result<()> {
            self.calls.lock().unwrap().push("prompt");
            self.prompts.lock().unwrap().push(prepared.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl ToolServerConfigurator for FakeCollaborators {
        async fn build_config(
            &self,
            _context: &EventContext,
            _branches: &BranchInfo,
            comment_id: u64,
            _allowed_tools: &[String],
        ) -> Result<String> {
            self.calls.lock().unwrap().push("tool_server");
            Ok(format!("{{\"comment_id\":{comment_id}}}"))
        }
    }
}
