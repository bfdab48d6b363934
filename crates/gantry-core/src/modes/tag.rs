//! The default mode: engage when a human mentions, assigns, or labels the
//! agent onto an issue or pull request.

use anyhow::{bail, Result};
use async_trait::async_trait;

use super::{
    build_prepared_context, run_prepare, Mode, ModeOptions, ModeResult, ModeRunData,
    PreparedModeContext,
};
use crate::context::EventContext;
use crate::trigger::check_contains_trigger;

#[derive(Debug)]
pub struct TagMode;

#[async_trait]
impl Mode for TagMode {
    fn name(&self) -> &'static str {
        "tag"
    }

    fn description(&self) -> &'static str {
        "Traditional implementation mode triggered by @claude mentions"
    }

    fn should_trigger(&self, context: &EventContext) -> bool {
        check_contains_trigger(context)
    }

    fn prepare_context(
        &self,
        context: &EventContext,
        run_data: Option<ModeRunData>,
    ) -> PreparedModeContext {
        build_prepared_context(self.name(), context, run_data)
    }

    fn allowed_tools(&self) -> Vec<String> {
        Vec::new()
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
                "tag mode requires an issue or pull request context, got {}",
                options.context.event_name
            );
        }
        run_prepare(self, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::TagMode;
    use crate::modes::test_support::{context_for, FakeCollaborators};
    use crate::modes::{Mode, ModeOptions};
    use serde_json::json;

    #[test]
    fn unit_tag_mode_surface_properties() {
        assert_eq!(TagMode.name(), "tag");
        assert!(TagMode.creates_tracking_comment());
        assert!(TagMode.allowed_tools().is_empty());
        assert!(TagMode.disallowed_tools().is_empty());
    }

    #[test]
    fn functional_should_trigger_delegates_to_composite_check() {
        let with_mention = context_for(
            "issue_comment",
            json!({
                "action": "created",
                "issue": {"number": 1},
                "comment": {"id": 2, "body": "Hey @claude, can you help?"}
            }),
            &[],
        );
        assert!(TagMode.should_trigger(&with_mention));

        let without_mention = context_for(
            "issue_comment",
            json!({
                "action": "created",
                "issue": {"number": 1},
                "comment": {"id": 2, "body": "This is just a regular comment"}
            }),
            &[],
        );
        assert!(!TagMode.should_trigger(&without_mention));
    }

    #[test]
    fn functional_should_trigger_via_assignee_and_label() {
        let assigned = context_for(
            "issues",
            json!({
                "action": "assigned",
                "assignee": {"login": "claude-bot"},
                "issue": {"number": 1}
            }),
            &[("ASSIGNEE_TRIGGER", "claude-bot")],
        );
        assert!(TagMode.should_trigger(&assigned));

        let labeled = context_for(
            "issues",
            json!({
                "action": "labeled",
                "label": {"name": "claude-help"},
                "issue": {"number": 1}
            }),
            &[("LABEL_TRIGGER", "claude-help")],
        );
        assert!(TagMode.should_trigger(&labeled));
    }

    #[tokio::test]
    async fn integration_prepare_rejects_non_entity_events() {
        let context = context_for("workflow_dispatch", json!({"inputs": {}}), &[]);
        let fakes = FakeCollaborators::default();
        let error = TagMode
            .prepare(ModeOptions {
                context: &context,
                comments: &fakes,
                branches: &fakes,
                fetcher: &fakes,
                prompts: &fakes,
                tool_server: &fakes,
            })
            .await
            .unwrap_err();
        assert!(error.to_string().contains("workflow_dispatch"));
        assert!(fakes.calls.lock().unwrap().is_empty());
    }
}
