//! Code-review mode: engages on pull request events directly, without a
//! textual mention, and grants the GitHub review tool surface. Ships in-tree
//! as a registerable extension; it is not part of the static built-in set.

use anyhow::{bail, Result};
use async_trait::async_trait;

use super::{
    build_prepared_context, run_prepare, Mode, ModeOptions, ModeResult, ModeRunData,
    PreparedModeContext,
};
use crate::context::EventContext;
use crate::event_payload::EventPayload;
use crate::trigger::check_contains_trigger;

const REVIEW_TOOLS: &[&str] = &[
    "mcp__github__*",
    "mcp__github_comment__*",
    "mcp__github__create_pending_pull_request_review",
    "mcp__github__add_comment_to_pending_review",
    "mcp__github__submit_pending_pull_request_review",
    "mcp__github__get_pull_request",
    "mcp__github__get_pull_request_diff",
    "mcp__github__get_pull_request_files",
];

#[derive(Debug)]
pub struct ReviewMode;

#[async_trait]
impl Mode for ReviewMode {
    fn name(&self) -> &'static str {
        "review"
    }

    fn description(&self) -> &'static str {
        "Code review mode for inline comments and suggestions"
    }

    fn should_trigger(&self, context: &EventContext) -> bool {
        context.is_entity_event()
            && (matches!(context.payload, EventPayload::PullRequest(_))
                || check_contains_trigger(context))
    }

    fn prepare_context(
        &self,
        context: &EventContext,
        run_data: Option<ModeRunData>,
    ) -> PreparedModeContext {
        build_prepared_context(self.name(), context, run_data)
    }

    fn allowed_tools(&self) -> Vec<String> {
        REVIEW_TOOLS.iter().map(ToString::to_string).collect()
    }

    fn disallowed_tools(&self) -> Vec<String> {
        Vec::new()
    }

    fn creates_tracking_comment(&self) -> bool {
        true
    }

    async fn prepare(&self, options: ModeOptions<'_>) -> Result<ModeResult> {
        if !options.context.is_entity_event() {
            bail!(
                "review mode requires an issue or pull request context, got {}",
                options.context.event_name
            );
        }
        run_prepare(self, options).await
    }
}
